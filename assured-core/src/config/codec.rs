//! Body encoding and decoding settings.

use super::Config;

/// Request body encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    default_content_charset: String,
    // Mime type (lowercase, no parameters) to charset.
    content_type_charsets: Vec<(String, String)>,
    append_default_content_charset: bool,
    user_configured: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            default_content_charset: "ISO-8859-1".to_string(),
            content_type_charsets: vec![
                ("application/json".to_string(), "UTF-8".to_string()),
                ("text/json".to_string(), "UTF-8".to_string()),
            ],
            append_default_content_charset: true,
            user_configured: false,
        }
    }
}

fn mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

impl EncoderConfig {
    /// Create the default encoder config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the charset appended to text content types without one.
    pub fn default_content_charset(mut self, charset: impl Into<String>) -> Self {
        self.default_content_charset = charset.into();
        self.user_configured = true;
        self
    }

    /// Set the charset used for one content type, e.g. `text/csv`.
    pub fn default_charset_for_content_type(
        mut self,
        charset: impl Into<String>,
        content_type: &str,
    ) -> Self {
        let mime = mime_type(content_type);
        let charset = charset.into();
        match self.content_type_charsets.iter_mut().find(|(m, _)| *m == mime) {
            Some(entry) => entry.1 = charset,
            None => self.content_type_charsets.push((mime, charset)),
        }
        self.user_configured = true;
        self
    }

    /// Enable or disable appending the default charset to the content type.
    pub fn append_default_content_charset_to_content_type(mut self, append: bool) -> Self {
        self.append_default_content_charset = append;
        self.user_configured = true;
        self
    }

    /// The default charset.
    pub fn charset(&self) -> &str {
        &self.default_content_charset
    }

    /// The charset for a content type: its own entry, else the default.
    pub fn charset_for(&self, content_type: &str) -> &str {
        let mime = mime_type(content_type);
        self.content_type_charsets
            .iter()
            .find(|(m, _)| *m == mime)
            .map(|(_, charset)| charset.as_str())
            .unwrap_or(&self.default_content_charset)
    }

    /// Whether the default charset is appended.
    pub fn appends_charset(&self) -> bool {
        self.append_default_content_charset
    }

    /// Append the charset for a textual content type lacking one.
    pub fn content_type_with_charset(&self, content_type: &str) -> String {
        let lower = content_type.to_ascii_lowercase();
        let textual = lower.starts_with("text/")
            || lower.contains("json")
            || lower.contains("xml")
            || lower.starts_with("application/x-www-form-urlencoded");
        if !self.append_default_content_charset || !textual || lower.contains("charset=") {
            return content_type.to_string();
        }
        format!("{}; charset={}", content_type, self.charset_for(content_type))
    }
}

impl Config for EncoderConfig {
    fn is_user_configured(&self) -> bool {
        self.user_configured
    }
}

/// Response body decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    gzip: bool,
    brotli: bool,
    user_configured: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            gzip: true,
            brotli: true,
            user_configured: false,
        }
    }
}

impl DecoderConfig {
    /// Create the default decoder config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accept identity-encoded responses.
    pub fn no_content_decoders(mut self) -> Self {
        self.gzip = false;
        self.brotli = false;
        self.user_configured = true;
        self
    }

    /// Enable or disable gzip decoding.
    pub fn gzip(mut self, enable: bool) -> Self {
        self.gzip = enable;
        self.user_configured = true;
        self
    }

    /// Enable or disable brotli decoding.
    pub fn brotli(mut self, enable: bool) -> Self {
        self.brotli = enable;
        self.user_configured = true;
        self
    }

    /// Whether gzip decoding is enabled.
    pub fn decodes_gzip(&self) -> bool {
        self.gzip
    }

    /// Whether brotli decoding is enabled.
    pub fn decodes_brotli(&self) -> bool {
        self.brotli
    }
}

impl Config for DecoderConfig {
    fn is_user_configured(&self) -> bool {
        self.user_configured
    }
}
