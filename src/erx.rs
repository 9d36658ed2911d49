/// Layouted: predefined Layout shortcuts
/// ResultE<T> = Result<T, Erx>;
/// ResultEX = ResultE<()>;
/// fn smp<T: ToString>(error: T) -> Erx
/// fn amp<T: ToString>(additional: &str) -> impl Fn(T) -> Erx
/// fn emp<T: std::error::Error>(error: T) -> Erx
use crate::conf;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

lazy_static! {
    static ref APP_SHORT: String = conf::short();
}

/// Zero
pub static LAYOUTED_C_ZERO: &str = "0000";

/// ResultE<T> = Result<T, Erx>;
pub type ResultE<T> = Result<T, Erx>;

/// ResultEX = ResultE<()>;
pub type ResultEX = ResultE<()>;

/// Layouted: Some predefined Layouted methods
pub struct Layouted;

pub fn describe_error(e: &dyn std::error::Error) -> String {
    let mut description = e.to_string();
    let mut current = e.source();
    while let Some(source) = current {
        description.push_str(&format!("\nCaused by: {}", source));
        current = source.source();
    }
    description
}

/// emp: error message processor.
/// Keeps the full source chain of a std error under the `ORIGIN` extra key.
/// The resulting Erx lives in the STOR domain; it is used for driver/ORM failures.
pub fn emp<T: std::error::Error>(error: T) -> Erx {
    let extra = vec![(String::from("ORIGIN"), describe_error(&error))];
    let message = error.to_string();
    Erx { code: Layouted::store("FAIL"), message, extra }
}

/// smp: simple convert T: ToString to Erx
pub fn smp<T: ToString>(error: T) -> Erx {
    Erx { code: Default::default(), message: error.to_string(), extra: Vec::new() }
}

/// amp: return a function that converts T: ToString to Erx, prefixing the message with `additional`
pub fn amp<T: ToString>(additional: &str) -> impl Fn(T) -> Erx {
    let additional = additional.to_string();
    move |err: T| Erx { code: Default::default(), message: format!("{} : {}", additional, err.to_string()), extra: Vec::new() }
}

/// Predefined Layouted Code with length 4
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum PreL4 {
    /// Common
    COMM,
    /// Validation: rejected input, maps to 400
    VALI,
    /// Not found: missing record, maps to 404
    NOTF,
    /// Store: persistence failure
    STOR,
    /// Service
    SERV,
    /// Action
    ACTN,
    /// Client: remote call failure
    CLNT,
    /// Undefined
    UNDF,
    OTHE,
}

impl PreL4 {
    pub fn four(&self) -> &'static str {
        match self {
            PreL4::COMM => "COMM",
            PreL4::VALI => "VALI",
            PreL4::NOTF => "NOTF",
            PreL4::STOR => "STOR",
            PreL4::SERV => "SERV",
            PreL4::ACTN => "ACTN",
            PreL4::CLNT => "CLNT",
            PreL4::UNDF => "UNDF",
            PreL4::OTHE => "OTHE",
        }
    }

    pub fn from_four(s: &str) -> Option<PreL4> {
        match s.to_uppercase().as_str() {
            "COMM" => Some(PreL4::COMM),
            "VALI" => Some(PreL4::VALI),
            "NOTF" => Some(PreL4::NOTF),
            "STOR" => Some(PreL4::STOR),
            "SERV" => Some(PreL4::SERV),
            "ACTN" => Some(PreL4::ACTN),
            "CLNT" => Some(PreL4::CLNT),
            "UNDF" => Some(PreL4::UNDF),
            "OTHE" => Some(PreL4::OTHE),
            _ => None,
        }
    }
}

impl Display for PreL4 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.four())
    }
}

impl From<&str> for PreL4 {
    fn from(s: &str) -> Self {
        PreL4::from_four(s).unwrap_or(PreL4::OTHE)
    }
}

impl Layouted {
    /// validation: rejected request input
    pub fn validation(detail: &str) -> LayoutedC {
        LayoutedC::new(PreL4::VALI.four(), PreL4::COMM.four(), detail)
    }

    /// not_found: referenced record does not exist
    pub fn not_found(detail: &str) -> LayoutedC {
        LayoutedC::new(PreL4::NOTF.four(), PreL4::COMM.four(), detail)
    }

    /// store: persistence layer failure
    pub fn store(detail: &str) -> LayoutedC {
        LayoutedC::new(PreL4::STOR.four(), PreL4::COMM.four(), detail)
    }

    /// client
    pub fn client(detail: &str) -> LayoutedC {
        LayoutedC::new(PreL4::CLNT.four(), PreL4::COMM.four(), detail)
    }
}

/// Code format
/// aaaa-xxxx-yyyy-zzzz
///
///    aaaa : application short name
///    xxxx : domain, see PreL4
///    yyyy : category inside the domain
///    zzzz : concrete error
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LayoutedC {
    pub application: String,
    pub domain: String,
    pub category: String,
    pub detail: String,
}

impl LayoutedC {
    pub fn okay() -> LayoutedC {
        LayoutedC {
            application: APP_SHORT.clone(),
            domain: LAYOUTED_C_ZERO.into(),
            category: LAYOUTED_C_ZERO.into(),
            detail: LAYOUTED_C_ZERO.into(),
        }
    }

    pub fn new(domain: &str, category: &str, detail: &str) -> LayoutedC {
        LayoutedC { application: APP_SHORT.clone(), domain: domain.into(), category: category.into(), detail: detail.into() }
    }

    pub fn is_okc(&self) -> bool {
        [&self.domain, &self.category, &self.detail].iter().all(|part| part.chars().all(|c| c == '0'))
    }

    pub fn layout_string(&self) -> String {
        format!("{}-{}-{}-{}", self.application, self.domain, self.category, self.detail)
    }

    pub fn domain(&self) -> PreL4 {
        PreL4::from(self.domain.as_str())
    }
}

impl Default for LayoutedC {
    fn default() -> Self {
        let undefined = PreL4::UNDF.four();
        LayoutedC { application: APP_SHORT.clone(), domain: undefined.into(), category: undefined.into(), detail: undefined.into() }
    }
}

impl From<LayoutedC> for String {
    fn from(value: LayoutedC) -> Self {
        value.layout_string()
    }
}

impl From<String> for LayoutedC {
    fn from(value: String) -> Self {
        let mut c = LayoutedC::default();
        let mut parts = value.split('-');
        if let Some(application) = parts.next() {
            c.application = application.to_string();
        }
        if let Some(domain) = parts.next() {
            c.domain = domain.to_string();
        }
        if let Some(category) = parts.next() {
            c.category = category.to_string();
        }
        if let Some(detail) = parts.next() {
            c.detail = detail.to_string();
        }
        c
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Erx {
    code: LayoutedC,
    message: String,
    extra: Vec<(String, String)>,
}

impl Erx {
    pub fn new(message: &str) -> Erx {
        Erx { code: Default::default(), message: message.to_string(), extra: Vec::new() }
    }

    pub fn with_code(code: LayoutedC, message: &str) -> Erx {
        Erx { code, message: message.to_string(), extra: Vec::new() }
    }

    /// rejected input, surfaced as 400
    pub fn validation(message: &str) -> Erx {
        Erx::with_code(Layouted::validation("1000"), message)
    }

    /// missing record, surfaced as 404
    pub fn not_found(message: &str) -> Erx {
        Erx::with_code(Layouted::not_found("1000"), message)
    }

    /// persistence failure, surfaced as 500
    pub fn store(message: &str) -> Erx {
        Erx::with_code(Layouted::store("1000"), message)
    }

    pub fn code(&self) -> LayoutedC {
        self.code.clone()
    }

    pub fn domain(&self) -> PreL4 {
        self.code.domain()
    }

    pub fn is_validation(&self) -> bool {
        self.domain() == PreL4::VALI
    }

    pub fn is_not_found(&self) -> bool {
        self.domain() == PreL4::NOTF
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn description(&self) -> String {
        let mut description = self.code.layout_string();
        description.push(' ');
        description.push_str(&self.message);
        if self.extra.is_empty() {
            return description;
        }

        let extra: Vec<String> = self.extra.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        description.push_str(&format!(" {{ {} }}", extra.join(", ")));
        description
    }

    pub fn extra(&self) -> &Vec<(String, String)> {
        &self.extra
    }

    /// get extra value, if not exists, return None
    pub fn extra_val(&self, key: &str) -> Option<String> {
        self.extra.iter().find(|e| e.0.eq(key)).map(|e| e.1.clone())
    }

    /// add extra
    /// if key exists, replace value
    pub fn add_extra(&mut self, key: &str, value: &str) -> &mut Self {
        for (k, v) in self.extra.iter_mut() {
            if *k == key {
                *v = value.to_string();
                return self;
            }
        }

        self.extra.push((key.to_string(), value.to_string()));
        self
    }
}

impl Display for Erx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::error::Error for Erx {}

impl From<&str> for Erx {
    fn from(s: &str) -> Self {
        Erx::new(s)
    }
}

impl From<String> for Erx {
    fn from(s: String) -> Erx {
        Erx::new(&s)
    }
}

impl From<sea_orm::DbErr> for Erx {
    fn from(value: sea_orm::DbErr) -> Self {
        emp(value)
    }
}

impl From<validator::ValidationErrors> for Erx {
    fn from(value: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = vec![];
        collect_validation_messages("", &value, &mut messages);
        messages.sort();
        Erx::validation(&messages.join("; "))
    }
}

fn collect_validation_messages(prefix: &str, errors: &validator::ValidationErrors, messages: &mut Vec<String>) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() { field.to_string() } else { format!("{}.{}", prefix, field) };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for error in list {
                    let message = error.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| error.code.to_string());
                    messages.push(format!("{}: {}", path, message));
                }
            },
            ValidationErrorsKind::Struct(nested) => collect_validation_messages(&path, nested, messages),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_validation_messages(&format!("{}[{}]", path, index), nested, messages);
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouted_string_roundtrip() {
        let code = Layouted::validation("0042");
        let text: String = code.clone().into();
        let back: LayoutedC = text.into();
        assert_eq!(code, back);
        assert_eq!(back.domain(), PreL4::VALI);
    }

    #[test]
    fn okay_code_is_zero() {
        assert!(LayoutedC::okay().is_okc());
        assert!(!Layouted::store("0001").is_okc());
    }

    #[test]
    fn domain_helpers() {
        assert!(Erx::validation("bad limit").is_validation());
        assert!(Erx::not_found("gone").is_not_found());
        assert_eq!(Erx::store("down").domain(), PreL4::STOR);
        assert_eq!(Erx::new("plain").domain(), PreL4::UNDF);
    }

    #[test]
    fn extra_replaces_existing_key() {
        let mut erx = Erx::new("x");
        erx.add_extra("k", "1").add_extra("k", "2");
        assert_eq!(erx.extra().len(), 1);
        assert_eq!(erx.extra_val("k"), Some("2".to_string()));
        assert!(erx.description().contains("k=2"));
    }

    #[test]
    fn amp_prefixes_message() {
        let erx = amp::<&str>("load")("timeout");
        assert_eq!(erx.message(), "load : timeout");
    }
}
