//! Brand heuristics: medication detection, company lookup, and the
//! brand-name → domain conversion used for domain-authority lookups.
//!
//! Knowledge lives in `config/brand_knowledge.toml`; the compiled-in copy is
//! the default and an external file can override it at startup.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static BUILTIN: Lazy<BrandKnowledge> = Lazy::new(|| {
    toml::from_str(include_str!("../config/brand_knowledge.toml"))
        .expect("valid built-in brand knowledge")
});

#[derive(Debug, Clone, Deserialize)]
pub struct BrandKnowledge {
    medication_suffixes: Vec<String>,
    known_medications: Vec<String>,
    #[serde(default)]
    manufacturers: HashMap<String, ManufacturerEntry>,
    #[serde(default)]
    companies: HashMap<String, CompanyEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct ManufacturerEntry {
    name: String,
    category: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CompanyEntry {
    name: String,
    industry: String,
    hq: String,
}

/// What kind of brand a name most likely refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrandKind {
    Medication,
    Company,
    Unknown,
}

/// Resolved brand context used to steer analysis prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    pub kind: BrandKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hq: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl BrandKnowledge {
    /// Compiled-in default knowledge.
    pub fn builtin() -> &'static BrandKnowledge {
        &BUILTIN
    }

    /// Load an override file (same TOML shape as the built-in one).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("reading brand knowledge from {}", path.as_ref().display()))?;
        toml::from_str(&data).context("parsing brand knowledge toml")
    }

    /// Heuristic: common pharma name endings plus a known-medication list.
    pub fn is_probably_medication(&self, brand: &str) -> bool {
        let lower = brand.to_lowercase();
        self.medication_suffixes.iter().any(|s| lower.ends_with(s.as_str()))
            || self.known_medications.iter().any(|m| m == &lower)
    }

    /// Resolve brand context. Medications map to their manufacturer when
    /// known; companies to their industry/HQ entry; anything else is Unknown.
    pub fn company_info(&self, brand: &str) -> CompanyInfo {
        let lower = brand.to_lowercase();

        if self.is_probably_medication(brand) {
            return match self.manufacturers.get(&lower) {
                Some(m) => CompanyInfo {
                    name: m.name.clone(),
                    kind: BrandKind::Medication,
                    industry: None,
                    hq: None,
                    category: Some(m.category.clone()),
                },
                None => CompanyInfo {
                    name: brand.to_string(),
                    kind: BrandKind::Medication,
                    industry: None,
                    hq: None,
                    category: Some("Pharmaceutical".to_string()),
                },
            };
        }

        match self.companies.get(&lower) {
            Some(c) => CompanyInfo {
                name: c.name.clone(),
                kind: BrandKind::Company,
                industry: Some(c.industry.clone()),
                hq: Some(c.hq.clone()),
                category: None,
            },
            None => CompanyInfo {
                name: brand.to_string(),
                kind: BrandKind::Unknown,
                industry: None,
                hq: None,
                category: None,
            },
        }
    }
}

/// Convert a brand name to a domain-like string for metric lookups:
/// lowercase, ASCII alphanumerics only, `.com` appended.
pub fn domain_for_brand(brand: &str) -> String {
    let mut domain: String = brand
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    domain.push_str(".com");
    domain
}
