//! Erro unificado do core: código do catálogo + contexto estruturado.
//!
//! Valores de contexto são saneados na entrada (sem quebras de linha, no
//! máximo `CONTEXT_VALUE_MAX` bytes), então UI e logs podem usá-los direto.
use core::fmt::{self, Write as _};
use std::collections::BTreeMap;

use crate::amm::error_catalog::{default_locale_message, AmmErrorCode};

const CONTEXT_VALUE_MAX: usize = 256;

fn sanitize_value(input: &str) -> String {
    let flat = input.replace(['\n', '\r', '\t'], " ");
    if flat.len() <= CONTEXT_VALUE_MAX {
        return flat;
    }
    let mut cut: String = flat.chars().take(CONTEXT_VALUE_MAX - 1).collect();
    cut.push('…');
    cut
}

/// String escapada para JSON, escrita direto no formatter.
struct JsonStr<'a>(&'a str);

impl fmt::Display for JsonStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in self.0.chars() {
            match ch {
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                '\t' => f.write_str("\\t")?,
                c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
                c => f.write_char(c)?,
            }
        }
        Ok(())
    }
}

/// Substitui `{chave}` pelo valor do contexto; chaves desconhecidas ficam como estão.
fn render_template(template: &str, context: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let key = &after[..close];
                match context.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Erro do core com contexto estruturado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmmError {
    pub code: AmmErrorCode,
    pub context: BTreeMap<String, String>,
}

impl AmmError {
    pub fn new(code: AmmErrorCode) -> Self {
        Self { code, context: BTreeMap::new() }
    }

    /// Adiciona um par chave/valor; chave vazia é ignorada.
    pub fn with_context<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: ToString,
    {
        let key = key.into();
        if !key.is_empty() {
            self.context.insert(key, sanitize_value(&value.to_string()));
        }
        self
    }

    pub fn code(&self) -> AmmErrorCode {
        self.code
    }

    pub fn is(&self, code: AmmErrorCode) -> bool {
        self.code == code
    }

    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context.get(key).map(String::as_str)
    }

    fn message(&self) -> String {
        render_template(default_locale_message(self.code), &self.context)
    }

    /// Mensagem curta para UI: `[AMM-000N] mensagem`.
    pub fn to_user_string(&self) -> String {
        format!("[{}] {}", self.code.code(), self.message())
    }

    /// JSON estável para logs: `code`, `title`, `message`, `context` (chaves ordenadas).
    pub fn to_log_json(&self) -> String {
        let mut json = String::with_capacity(128);
        // escrever numa String não falha
        let _ = write!(
            json,
            "{{\"code\":\"{}\",\"title\":\"{}\",\"message\":\"{}\",\"context\":{{",
            JsonStr(self.code.code()),
            JsonStr(self.code.title()),
            JsonStr(&self.message()),
        );
        for (i, (key, value)) in self.context.iter().enumerate() {
            if i > 0 {
                json.push(',');
            }
            let _ = write!(json, "\"{}\":\"{}\"", JsonStr(key), JsonStr(value));
        }
        json.push_str("}}");
        json
    }
}

impl fmt::Display for AmmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_user_string())
    }
}

impl std::error::Error for AmmError {}

impl From<AmmErrorCode> for AmmError {
    fn from(code: AmmErrorCode) -> Self {
        Self::new(code)
    }
}

pub type Result<T> = std::result::Result<T, AmmError>;

/// `amm_err!(código)` ou `amm_err!(código, chave => valor, ...)`.
#[macro_export]
macro_rules! amm_err {
    ($code:expr) => {
        $crate::amm::error::AmmError::new($code)
    };
    ($code:expr, $($key:ident => $value:expr),+ $(,)?) => {
        $crate::amm::error::AmmError::new($code)
            $(.with_context(stringify!($key), $value))+
    };
    ($code:expr, { $($key:expr => $value:expr),+ $(,)? }) => {
        $crate::amm::error::AmmError::new($code)
            $(.with_context($key, $value))+
    };
}

#[macro_export]
macro_rules! amm_bail {
    ($($tt:tt)*) => {
        return Err($crate::amm_err!($($tt)*))
    };
}
