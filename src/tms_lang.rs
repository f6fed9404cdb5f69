// Localized UI strings (English and Chinese)
// Placeholders are written as {} and filled in order by `fill`

use std::fmt::Display;

#[derive(Clone)]
pub struct Assets {
    // Menu items
    pub menu_help: &'static str,
    pub menu_new: &'static str,
    pub menu_records: &'static str,
    pub menu_board: &'static str,
    pub menu_options: &'static str,
    pub menu_about: &'static str,
    pub menu_exit: &'static str,

    // Board size modal
    pub board_title: &'static str,
    pub board_columns_fmt: &'static str, // "Columns ({}-{}):"
    pub board_rows_fmt: &'static str,    // "Rows ({}-{}):"
    pub board_mines_fmt: &'static str,   // "{} mines"
    pub board_out_of_range: &'static str,
    pub board_too_large: &'static str,

    // Options modal
    pub opt_show_indicator: &'static str,
    pub opt_use_question: &'static str,
    pub opt_ascii_icons: &'static str,
    pub opt_language: &'static str,

    // Help modal
    pub help_controls: &'static str,
    pub help_move: &'static str,
    pub help_reveal: &'static str,
    pub help_flag: &'static str,
    pub help_chord: &'static str,
    pub help_pause: &'static str,

    // Records modal
    pub rec_best_time: &'static str,
    pub rec_no_record: &'static str,

    // Win/Loss modals
    pub win_title: &'static str,
    pub win_message: &'static str,
    pub win_moves_fmt: &'static str, // "Moves: {}"
    pub win_time_fmt: &'static str,  // "Time: {}"
    pub win_new_record: &'static str,

    pub loss_title: &'static str,
    pub loss_message: &'static str,
    pub loss_better_luck: &'static str,

    // About modal
    pub about_description: &'static str,
    pub about_version_fmt: &'static str, // "v{} by {}"

    // Status bar
    pub status_mines_fmt: &'static str, // " Mines: {} "
    pub status_moves_fmt: &'static str, // " Moves: {} "
    pub status_start_hint: &'static str,
    pub status_paused: &'static str,

    // Buttons
    pub btn_ok: &'static str,
    pub btn_close: &'static str,
    pub btn_yes: &'static str,
    pub btn_no: &'static str,

    // Confirmation dialogs
    pub confirm_in_game: &'static str,
    pub confirm_exit: &'static str,
    pub confirm_new: &'static str,
    pub confirm_resize_fmt: &'static str, // "Start a new {} x {} game?"

    // Terminal size messages
    pub tsmsg_line1: &'static str,
    pub tsmsg_line2: &'static str, // "Minimum size required: {} x {}"
    pub tsmsg_title: &'static str,
    pub fatal_line1: &'static str, // "A {} x {} board cannot fit this terminal"
    pub fatal_line2: &'static str,

    // Pause overlay
    pub paused_title: &'static str,
    pub paused_hint: &'static str,

    // Language names for selection
    pub lang_english: &'static str,
    pub lang_chinese: &'static str,
}

pub fn english_assets() -> Assets {
    Assets {
        menu_help: "Help",
        menu_new: "New",
        menu_records: "Records",
        menu_board: "Board",
        menu_options: "Options",
        menu_about: "About",
        menu_exit: "Exit",

        board_title: "Board size",
        board_columns_fmt: "Columns ({}-{}):",
        board_rows_fmt: "Rows ({}-{}):",
        board_mines_fmt: "{} mines",
        board_out_of_range: "Out of range",
        board_too_large: "Too large for this terminal",

        opt_show_indicator: "Show indicator",
        opt_use_question: "Use ? marks",
        opt_ascii_icons: "ASCII icons",
        opt_language: "Language",

        help_controls: " Controls:",
        help_move: "  Mouse | Arrows        - move cursor",
        help_reveal: "  L-Click | Space       - reveal",
        help_flag: "  R-Click | Hold L | F  - cycle mark",
        help_chord: "  L+R | M-Click | Enter - chord (open neighbors)",
        help_pause: "  P                     - pause / resume",

        rec_best_time: " Best times:",
        rec_no_record: " No records yet",

        win_title: "Success",
        win_message: "All mines cleared. You win!",
        win_moves_fmt: "Moves: {}",
        win_time_fmt: "Time: {}",
        win_new_record: "New record!",

        loss_title: "Failure",
        loss_message: "A mine exploded. You lose!",
        loss_better_luck: "Better luck next time.",

        about_description: "Classic Minesweeper for the terminal",
        about_version_fmt: "v{} by {}",

        status_mines_fmt: " Mines: {} ",
        status_moves_fmt: " Moves: {} ",
        status_start_hint: " Click any cell to start ",
        status_paused: " Paused ",

        btn_ok: " OK ",
        btn_close: " CLOSE ",
        btn_yes: " Yes ",
        btn_no: " No ",

        confirm_in_game: "Game in progress",
        confirm_exit: "Confirm exit?",
        confirm_new: "Start a new game?",
        confirm_resize_fmt: "Start a new {} x {} game?",

        tsmsg_line1: "Terminal layout too small",
        tsmsg_line2: "Minimum size required: {} x {}",
        tsmsg_title: "Resize needed",
        fatal_line1: "A {} x {} board cannot fit this terminal",
        fatal_line2: "Press any key to exit",

        paused_title: "Paused",
        paused_hint: "Press P to resume",

        lang_english: "English",
        lang_chinese: "中文",
    }
}

pub fn chinese_assets() -> Assets {
    Assets {
        menu_help: "帮助",
        menu_new: "新游戏",
        menu_records: "纪录",
        menu_board: "棋盘",
        menu_options: "选项",
        menu_about: "关于",
        menu_exit: "退出",

        board_title: "棋盘大小",
        board_columns_fmt: "列数 ({}-{}):",
        board_rows_fmt: "行数 ({}-{}):",
        board_mines_fmt: "{} 个雷",
        board_out_of_range: "超出范围",
        board_too_large: "终端放不下",

        opt_show_indicator: "显示游标",
        opt_use_question: "使用问号",
        opt_ascii_icons: "ASCII图标",
        opt_language: "语言",

        help_controls: " 操作说明：",
        help_move: "  鼠标 | 方向键        - 移动光标",
        help_reveal: "  左键 | 空格          - 翻开",
        help_flag: "  右键 | 长按左键 | F  - 切换标记",
        help_chord: "  双键 | 中键 | 回车   - 组合排雷（开邻近格子）",
        help_pause: "  P                    - 暂停 / 继续",

        rec_best_time: " 最佳时间：",
        rec_no_record: " 暂无纪录",

        win_title: "成功",
        win_message: "地雷已清除，你赢了！",
        win_moves_fmt: "步数：{}",
        win_time_fmt: "用时：{}",
        win_new_record: "新纪录！",

        loss_title: "失败",
        loss_message: "地雷爆炸，你输了！",
        loss_better_luck: "祝下次好运。",

        about_description: "一款基于终端的经典扫雷游戏",
        about_version_fmt: "v{} 作者 {}",

        status_mines_fmt: " 地雷：{} ",
        status_moves_fmt: " 步数：{} ",
        status_start_hint: " 点击任意格子开始 ",
        status_paused: " 已暂停 ",

        btn_ok: " 确定 ",
        btn_close: " 关闭 ",
        btn_yes: " 是 ",
        btn_no: " 否 ",

        confirm_in_game: "游戏正在进行中",
        confirm_exit: "确认退出吗？",
        confirm_new: "重开一局吗？",
        confirm_resize_fmt: "以 {} x {} 重开一局吗？",

        tsmsg_line1: "终端屏幕布局过小",
        tsmsg_line2: "最小需要尺寸：{} x {}",
        tsmsg_title: "需要调整大小",
        fatal_line1: "{} x {} 的棋盘无法放入当前终端",
        fatal_line2: "按任意键退出",

        paused_title: "已暂停",
        paused_hint: "按 P 继续",

        lang_english: "English",
        lang_chinese: "中文",
    }
}

/// Replace each {} in `fmt` with the next argument
pub fn fill(fmt: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(fmt.len() + 8);
    let mut rest = fmt;
    for arg in args {
        let Some(pos) = rest.find("{}") else { break };
        out.push_str(&rest[..pos]);
        out.push_str(&arg.to_string());
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}

fn normalize(lang_code: &str) -> &'static str {
    if lang_code.to_lowercase().starts_with("zh") {
        "zh"
    } else {
        "en"
    }
}

/// Current language code and its string assets
pub struct Lang {
    pub current_lang: String,
    pub assets: Assets,
}

impl Lang {
    /// Accepts codes like "zh-CN"; anything unsupported becomes English
    pub fn new(lang_code: &str) -> Self {
        let mut lang = Lang {
            current_lang: String::new(),
            assets: english_assets(),
        };
        lang.switch_to(lang_code);
        lang
    }

    pub fn switch_to(&mut self, lang_code: &str) {
        let code = normalize(lang_code);
        self.current_lang = code.to_string();
        self.assets = if code == "zh" {
            chinese_assets()
        } else {
            english_assets()
        };
    }

    /// Languages offered in the options modal: (code, display name)
    pub fn choices(&self) -> [(&'static str, &'static str); 2] {
        [
            ("en", self.assets.lang_english),
            ("zh", self.assets.lang_chinese),
        ]
    }

    /// English: MM/DD/YYYY, Chinese: YYYY年MM月DD日
    pub fn format_date(&self, iso_date: &str) -> String {
        let parts: Vec<&str> = iso_date.split('-').collect();
        if parts.len() != 3 {
            return iso_date.to_string();
        }
        if self.current_lang == "zh" {
            format!("{}年{}月{}日", parts[0], parts[1], parts[2])
        } else {
            format!("{}/{}/{}", parts[1], parts[2], parts[0])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_substitutes_in_order() {
        assert_eq!(fill("{} x {}", &[&16, &9]), "16 x 9");
        assert_eq!(fill("Time: {}", &[&"1:05.042"]), "Time: 1:05.042");
        assert_eq!(fill("no slots", &[&1]), "no slots");
        assert_eq!(fill("{} and {}", &[&1]), "1 and {}");
    }

    #[test]
    fn language_codes_are_normalized() {
        assert_eq!(Lang::new("zh-CN").current_lang, "zh");
        assert_eq!(Lang::new("fr_FR").current_lang, "en");
        let mut lang = Lang::new("en");
        lang.switch_to("ZH");
        assert_eq!(lang.assets.menu_new, "新游戏");
    }

    #[test]
    fn dates_follow_language() {
        assert_eq!(Lang::new("en").format_date("2026-01-22"), "01/22/2026");
        assert_eq!(Lang::new("zh").format_date("2026-01-22"), "2026年01月22日");
        assert_eq!(Lang::new("en").format_date("garbled"), "garbled");
    }
}
