// ==========================================
// 整车厂运营台账 - 输出语言
// ==========================================
// rust-i18n 的 locale 是进程级全局状态
// 翻译文件: locales/zh-CN.yml（默认）、locales/en.yml
// rust_i18n::i18n! 宏在 lib.rs 中初始化
// ==========================================

use std::fmt;
use std::str::FromStr;

/// 已提供翻译的语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    ZhCn,
    En,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::ZhCn => "zh-CN",
            Locale::En => "en",
        }
    }

    /// 当前生效的语言（未知代码按默认语言处理）
    pub fn current() -> Self {
        rust_i18n::locale().parse().unwrap_or_default()
    }

    /// 切换进程的输出语言
    pub fn activate(self) {
        rust_i18n::set_locale(self.code());
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    /// 接受 "zh-CN"、"zh"、"en"，以及 "en_US.UTF-8" 这类环境变量写法
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lang = s
            .split(['.', '@'])
            .next()
            .unwrap_or_default()
            .replace('_', "-")
            .to_ascii_lowercase();
        match lang.as_str() {
            "zh" | "zh-cn" | "zh-hans" => Ok(Locale::ZhCn),
            "en" => Ok(Locale::En),
            _ if lang.starts_with("en-") => Ok(Locale::En),
            _ => Err(format!("unsupported locale: {}", s)),
        }
    }
}

/// 翻译消息
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息并填充 %{name} 占位符
///
/// # 示例
/// ```no_run
/// use carmaker_ledger::i18n::t_with_args;
/// let msg = t_with_args("factory.created", &[("name", "Torino")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(t(key), |text, (name, value)| {
        text.replace(&format!("%{{{}}}", name), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_parse_locale() {
        assert_eq!("zh-CN".parse::<Locale>(), Ok(Locale::ZhCn));
        assert_eq!("en".parse::<Locale>(), Ok(Locale::En));
        assert_eq!("en_US.UTF-8".parse::<Locale>(), Ok(Locale::En));
        assert_eq!("zh_CN.UTF-8".parse::<Locale>(), Ok(Locale::ZhCn));
        assert!("xx-YY".parse::<Locale>().is_err());
    }

    #[test]
    fn test_activate() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        Locale::En.activate();
        assert_eq!(Locale::current(), Locale::En);
        assert_eq!(t("common.success"), "Operation successful");

        Locale::ZhCn.activate();
        assert_eq!(Locale::current(), Locale::ZhCn);
        assert_eq!(t("common.success"), "操作成功");
    }

    #[test]
    fn test_translate_with_args() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        Locale::En.activate();
        let msg = t_with_args("plan.failed", &[("model", "M1"), ("shortfall", "30")]);
        assert_eq!(msg, "Plan not fully satisfied: model M1 short by 30");

        Locale::ZhCn.activate();
        let msg = t_with_args("import.file_not_found", &[("path", "/tmp/models.tsv")]);
        assert!(msg.contains("/tmp/models.tsv"));
    }
}
