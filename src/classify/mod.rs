//! Document classification from extracted PDF text.
//!
//! The portal hands out three kinds of documents, all in German: the
//! annual wage-tax certificate, the social-insurance registration
//! certificate, and the monthly payslip (possibly a correction run). Their
//! text is matched against a fixed, priority-ordered list of rules; the
//! first rule that recognises the document decides its category and
//! canonical filename.

mod extract;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

pub use extract::{ExtractedDocument, ExtractionError, PdfTextExtractor, TextExtractor};

#[allow(clippy::expect_used)]
static TAX_CERTIFICATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Ausdruck der elektronischen Lohnsteuerbescheinigung für (\d{4})")
        .expect("tax certificate pattern is valid")
});

#[allow(clippy::expect_used)]
static SOCIAL_INSURANCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Meldebescheinigung zur Sozialversicherung")
        .expect("social insurance pattern is valid")
});

#[allow(clippy::expect_used)]
static PAYSLIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Verdienstabrechnung").expect("payslip pattern is valid"));

#[allow(clippy::expect_used)]
static BILLING_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Abrechnungsmonat:?\s*([A-Za-zäöüÄÖÜß]+)\s+(\d{4})")
        .expect("billing month pattern is valid")
});

#[allow(clippy::expect_used)]
static CORRECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Rückrechnung:?\s*([A-Za-zäöüÄÖÜß]+)\s+(\d{4})")
        .expect("correction pattern is valid")
});

/// What a document is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Annual wage-tax certificate ("Lohnsteuerbescheinigung").
    TaxCertificate,
    /// Social-insurance registration certificate ("Meldebescheinigung").
    SocialInsuranceCertificate,
    /// Monthly payslip ("Verdienstabrechnung").
    Payslip,
    /// None of the above.
    Unrecognized,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::TaxCertificate => "tax certificate",
            Self::SocialInsuranceCertificate => "social insurance certificate",
            Self::Payslip => "payslip",
            Self::Unrecognized => "unrecognized",
        };
        f.write_str(label)
    }
}

/// The month and year a document covers.
///
/// Month names are kept exactly as they appear in the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Period {
    /// Month name, absent for annual documents.
    pub month: Option<String>,
    /// Four-digit year.
    pub year: String,
}

impl Period {
    fn year(year: &str) -> Self {
        Self {
            month: None,
            year: year.to_string(),
        }
    }

    fn month(month: &str, year: &str) -> Self {
        Self {
            month: Some(month.to_string()),
            year: year.to_string(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.month {
            Some(month) => write!(f, "{month} {}", self.year),
            None => f.write_str(&self.year),
        }
    }
}

/// Everything the classifier derived from one document's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    /// Document kind.
    pub category: Category,
    /// Billing period, when it could be extracted.
    pub period: Option<Period>,
    /// Whether this payslip is a correction run.
    pub is_correction: bool,
    /// The period a correction payslip recalculates.
    pub correction_period: Option<Period>,
    /// Canonical filename, absent when the document is unrecognized or incomplete.
    pub proposed_name: Option<String>,
}

impl ClassificationResult {
    fn unrecognized() -> Self {
        Self::incomplete(Category::Unrecognized)
    }

    /// A recognised document whose billing month could not be read.
    fn incomplete(category: Category) -> Self {
        Self {
            category,
            period: None,
            is_correction: false,
            correction_period: None,
            proposed_name: None,
        }
    }

    /// Recognised, but without a proposed name.
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        self.category != Category::Unrecognized && self.proposed_name.is_none()
    }
}

type Rule = fn(&str) -> Option<ClassificationResult>;

/// Classification rules in priority order; the first match wins.
const RULES: &[Rule] = &[tax_certificate, social_insurance_certificate, payslip];

/// Classifies a document by its extracted text.
#[must_use]
pub fn classify(text: &str) -> ClassificationResult {
    RULES
        .iter()
        .find_map(|rule| rule(text))
        .unwrap_or_else(ClassificationResult::unrecognized)
}

fn tax_certificate(text: &str) -> Option<ClassificationResult> {
    let captures = TAX_CERTIFICATE.captures(text)?;
    let year = &captures[1];
    Some(ClassificationResult {
        category: Category::TaxCertificate,
        period: Some(Period::year(year)),
        is_correction: false,
        correction_period: None,
        proposed_name: Some(format!("Lohnsteuerbescheinigung - {year}.pdf")),
    })
}

fn social_insurance_certificate(text: &str) -> Option<ClassificationResult> {
    if !SOCIAL_INSURANCE.is_match(text) {
        return None;
    }
    let Some(period) = billing_period(text) else {
        return Some(ClassificationResult::incomplete(
            Category::SocialInsuranceCertificate,
        ));
    };

    let proposed_name = format!("Meldebescheinigung zur Sozialversicherung - {period}.pdf");
    Some(ClassificationResult {
        category: Category::SocialInsuranceCertificate,
        period: Some(period),
        is_correction: false,
        correction_period: None,
        proposed_name: Some(proposed_name),
    })
}

fn payslip(text: &str) -> Option<ClassificationResult> {
    if !PAYSLIP.is_match(text) {
        return None;
    }
    let Some(period) = billing_period(text) else {
        return Some(ClassificationResult::incomplete(Category::Payslip));
    };

    let correction_period = CORRECTION
        .captures(text)
        .map(|captures| Period::month(&captures[1], &captures[2]));

    let proposed_name = match &correction_period {
        Some(corrected) => format!("Verdienstabrechnung - {corrected} - Rückrechnung.pdf"),
        None => format!("Verdienstabrechnung - {period}.pdf"),
    };

    Some(ClassificationResult {
        category: Category::Payslip,
        period: Some(period),
        is_correction: correction_period.is_some(),
        correction_period,
        proposed_name: Some(proposed_name),
    })
}

fn billing_period(text: &str) -> Option<Period> {
    BILLING_MONTH
        .captures(text)
        .map(|captures| Period::month(&captures[1], &captures[2]))
}
