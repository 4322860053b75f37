//! Query building blocks for `web_search_read`: the domain filter, the field
//! specification and the request context.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;
use serde_with::skip_serializing_none;

pub const PAGE_SIZE: usize = 1000;
pub const COUNT_LIMIT: usize = 10001;
pub const LANG: &str = "en_US";
pub const TIMEZONE: &str = "Asia/Dhaka";

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Term {
    Operator(&'static str),
    Leaf(String, String, Value),
}

/// Odoo domain in prefix (polish) notation.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct Domain(Vec<Term>);

impl Domain {
    pub fn new() -> Self {
        Domain(Vec::new())
    }

    pub fn and(mut self) -> Self {
        self.0.push(Term::Operator("&"));
        self
    }

    pub fn leaf(mut self, field: &str, operator: &str, value: impl Into<Value>) -> Self {
        self.0
            .push(Term::Leaf(field.to_string(), operator.to_string(), value.into()));
        self
    }
}

/// Field projection. Field order is kept as declared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Specification {
    fields: Vec<(String, Option<Specification>)>,
}

impl Specification {
    pub fn new() -> Self {
        Specification { fields: Vec::new() }
    }

    pub fn field(mut self, name: &str) -> Self {
        self.fields.push((name.to_string(), None));
        self
    }

    pub fn nested(mut self, name: &str, sub: Specification) -> Self {
        self.fields.push((name.to_string(), Some(sub)));
        self
    }

    /// `name: {"fields": {"display_name": {}}}`, the shape used for many2one fields.
    pub fn display_name(self, name: &str) -> Self {
        self.nested(name, Specification::new().field("display_name"))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

struct FieldSpec<'a>(&'a Option<Specification>);

impl Serialize for FieldSpec<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(sub) = self.0 {
            map.serialize_entry("fields", sub)?;
        }
        map.end()
    }
}

impl Serialize for Specification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, sub) in &self.fields {
            map.serialize_entry(name, &FieldSpec(sub))?;
        }
        map.end()
    }
}

/// Business units a query is allowed to see, and the one it acts as.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyScope {
    pub allowed: Vec<i64>,
    pub current: i64,
}

impl CompanyScope {
    pub fn single(company_id: i64) -> Self {
        CompanyScope {
            allowed: vec![company_id],
            current: company_id,
        }
    }
}

#[skip_serializing_none]
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct Context {
    pub lang: Option<String>,
    pub tz: Option<String>,
    pub uid: Option<i64>,
    pub allowed_company_ids: Option<Vec<i64>>,
    pub bin_size: Option<bool>,
    pub current_company_id: Option<i64>,
    pub active_model: Option<String>,
    pub active_id: Option<i64>,
    pub active_ids: Option<Vec<i64>>,
}

impl Context {
    /// `{"uid": uid}` only, as sent when creating a wizard.
    pub fn bare(uid: i64) -> Self {
        Context {
            uid: Some(uid),
            ..Default::default()
        }
    }

    pub fn localized(uid: i64, allowed_company_ids: Vec<i64>) -> Self {
        Context {
            lang: Some(LANG.to_string()),
            tz: Some(TIMEZONE.to_string()),
            uid: Some(uid),
            allowed_company_ids: Some(allowed_company_ids),
            ..Default::default()
        }
    }

    /// Context for record listing under a company scope.
    pub fn search(uid: i64, scope: &CompanyScope) -> Self {
        Context {
            bin_size: Some(true),
            current_company_id: Some(scope.current),
            ..Self::localized(uid, scope.allowed.clone())
        }
    }

    pub fn with_active(mut self, model: &str, id: i64) -> Self {
        self.active_model = Some(model.to_string());
        self.active_id = Some(id);
        self.active_ids = Some(vec![id]);
        self
    }
}

/// Everything needed to list one model's records.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    pub model: &'static str,
    pub domain: Domain,
    pub specification: Specification,
    pub page_size: usize,
}

impl QuerySpec {
    pub fn new(model: &'static str, domain: Domain, specification: Specification) -> Self {
        QuerySpec {
            model,
            domain,
            specification,
            page_size: PAGE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn domain_prefix_notation() {
        let domain = Domain::new()
            .and()
            .leaf("state", "=", "posted")
            .and()
            .leaf("invoice_date", ">=", "2025-07-01 00:00:00")
            .leaf("invoice_date", "<=", "2025-07-31 23:59:59");
        assert_eq!(
            serde_json::to_value(&domain).unwrap(),
            json!([
                "&", ["state", "=", "posted"],
                "&", ["invoice_date", ">=", "2025-07-01 00:00:00"],
                ["invoice_date", "<=", "2025-07-31 23:59:59"]
            ])
        );
    }

    #[test]
    fn specification_nests_fields() {
        let spec = Specification::new()
            .field("qty")
            .display_name("partner_id")
            .nested(
                "sale_order_line",
                Specification::new()
                    .nested(
                        "invoice_lines",
                        Specification::new().field("display_name").field("invoice_date"),
                    )
                    .field("invoice_status"),
            );
        assert_eq!(
            serde_json::to_value(&spec).unwrap(),
            json!({
                "qty": {},
                "partner_id": {"fields": {"display_name": {}}},
                "sale_order_line": {"fields": {
                    "invoice_lines": {"fields": {"display_name": {}, "invoice_date": {}}},
                    "invoice_status": {}
                }}
            })
        );
        assert_eq!(spec.len(), 3);
    }

    #[test]
    fn context_skips_unset_members() {
        let ctx = Context::bare(2);
        assert_eq!(serde_json::to_value(&ctx).unwrap(), json!({"uid": 2}));

        let ctx = Context::search(2, &CompanyScope::single(3));
        assert_eq!(
            serde_json::to_value(&ctx).unwrap(),
            json!({
                "lang": "en_US",
                "tz": "Asia/Dhaka",
                "uid": 2,
                "allowed_company_ids": [3],
                "bin_size": true,
                "current_company_id": 3
            })
        );
    }

    #[test]
    fn active_record_context() {
        let ctx = Context::localized(2, vec![1]).with_active("mrp.report.custom", 41);
        let value = serde_json::to_value(&ctx).unwrap();
        assert_eq!(value["active_model"], "mrp.report.custom");
        assert_eq!(value["active_ids"], json!([41]));
        assert!(value.get("bin_size").is_none());
    }
}
