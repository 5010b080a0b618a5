/// Localised presentation strings.
pub trait TextService: Send + Sync {
    /// Text for `key`; implementations fall back to the key itself.
    fn localize(&self, key: &str) -> String;
}

/// Built-in English catalog.
#[derive(Debug, Clone, Default)]
pub struct DefaultTextService;

impl TextService for DefaultTextService {
    fn localize(&self, key: &str) -> String {
        let text = match key {
            "user/password" => "Password",
            "user/passwordChanged" => "Your password has been changed",
            "user/passwordReset" => "The password has been reset",
            other => other,
        };
        text.to_string()
    }
}
