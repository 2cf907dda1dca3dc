use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// CRM
// ---------------------------------------------------------------------------

/// A field of the CRM deal record, in the order the record is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrmField {
    DealName,
    SchoolName,
    Salesperson,
    SchoolProfile,
    StudentCount,
    PriorityLevel,
    Mrr,
    Arr,
    SchoolPainPoints,
    SetupFee,
    ContractLink,
    OnboardingMode,
    ContactName,
    ContactPhone,
    ContactEmail,
}

impl CrmField {
    pub const ALL: [CrmField; 15] = [
        CrmField::DealName,
        CrmField::SchoolName,
        CrmField::Salesperson,
        CrmField::SchoolProfile,
        CrmField::StudentCount,
        CrmField::PriorityLevel,
        CrmField::Mrr,
        CrmField::Arr,
        CrmField::SchoolPainPoints,
        CrmField::SetupFee,
        CrmField::ContractLink,
        CrmField::OnboardingMode,
        CrmField::ContactName,
        CrmField::ContactPhone,
        CrmField::ContactEmail,
    ];

    /// Key used in the extraction JSON.
    pub fn key(self) -> &'static str {
        match self {
            CrmField::DealName => "nome",
            CrmField::SchoolName => "nome_escola",
            CrmField::Salesperson => "vendedor",
            CrmField::SchoolProfile => "perfil_escola",
            CrmField::StudentCount => "numero_alunos",
            CrmField::PriorityLevel => "nivel_prioridade",
            CrmField::Mrr => "mrr",
            CrmField::Arr => "arr",
            CrmField::SchoolPainPoints => "dor_escola",
            CrmField::SetupFee => "valor_implantacao",
            CrmField::ContractLink => "link_contrato",
            CrmField::OnboardingMode => "forma_implantacao",
            CrmField::ContactName => "contato_nome",
            CrmField::ContactPhone => "contato_telefone",
            CrmField::ContactEmail => "contato_email",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CrmField::DealName => "Deal",
            CrmField::SchoolName => "School",
            CrmField::Salesperson => "Salesperson",
            CrmField::SchoolProfile => "Profile",
            CrmField::StudentCount => "Students",
            CrmField::PriorityLevel => "Priority",
            CrmField::Mrr => "MRR",
            CrmField::Arr => "ARR",
            CrmField::SchoolPainPoints => "School pain points",
            CrmField::SetupFee => "Setup fee",
            CrmField::ContractLink => "Contract link",
            CrmField::OnboardingMode => "Onboarding mode",
            CrmField::ContactName => "Contact",
            CrmField::ContactPhone => "Phone",
            CrmField::ContactEmail => "E-mail",
        }
    }
}

/// CRM deal record as extracted from the screenshots. Values stay loosely
/// typed because the extraction model may return numbers as strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrmData {
    #[serde(rename = "nome")]
    pub deal_name: Option<Value>,
    #[serde(rename = "nome_escola")]
    pub school_name: Option<Value>,
    #[serde(rename = "vendedor")]
    pub salesperson: Option<Value>,
    #[serde(rename = "perfil_escola")]
    pub school_profile: Option<Value>,
    #[serde(rename = "numero_alunos")]
    pub student_count: Option<Value>,
    #[serde(rename = "nivel_prioridade")]
    pub priority_level: Option<Value>,
    pub mrr: Option<Value>,
    pub arr: Option<Value>,
    #[serde(rename = "dor_escola")]
    pub school_pain_points: Option<Value>,
    #[serde(rename = "valor_implantacao")]
    pub setup_fee: Option<Value>,
    #[serde(rename = "link_contrato")]
    pub contract_link: Option<Value>,
    #[serde(rename = "forma_implantacao")]
    pub onboarding_mode: Option<Value>,
    #[serde(rename = "contato_nome")]
    pub contact_name: Option<Value>,
    #[serde(rename = "contato_telefone")]
    pub contact_phone: Option<Value>,
    #[serde(rename = "contato_email")]
    pub contact_email: Option<Value>,
}

impl CrmData {
    pub fn get(&self, field: CrmField) -> Option<&Value> {
        let value = match field {
            CrmField::DealName => &self.deal_name,
            CrmField::SchoolName => &self.school_name,
            CrmField::Salesperson => &self.salesperson,
            CrmField::SchoolProfile => &self.school_profile,
            CrmField::StudentCount => &self.student_count,
            CrmField::PriorityLevel => &self.priority_level,
            CrmField::Mrr => &self.mrr,
            CrmField::Arr => &self.arr,
            CrmField::SchoolPainPoints => &self.school_pain_points,
            CrmField::SetupFee => &self.setup_fee,
            CrmField::ContractLink => &self.contract_link,
            CrmField::OnboardingMode => &self.onboarding_mode,
            CrmField::ContactName => &self.contact_name,
            CrmField::ContactPhone => &self.contact_phone,
            CrmField::ContactEmail => &self.contact_email,
        };
        value.as_ref().filter(|v| !v.is_null())
    }

    pub fn entries(&self) -> impl Iterator<Item = (CrmField, Option<&Value>)> + '_ {
        CrmField::ALL.into_iter().map(move |field| (field, self.get(field)))
    }
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractModel {
    #[serde(rename = "novo")]
    New,
    #[serde(rename = "antigo_v13")]
    LegacyV13,
    #[serde(rename = "desconhecido")]
    Unknown,
}

impl ContractModel {
    pub fn as_str(self) -> &'static str {
        match self {
            ContractModel::New => "novo",
            ContractModel::LegacyV13 => "antigo_v13",
            ContractModel::Unknown => "desconhecido",
        }
    }

    /// Official template the clauses are compared against.
    pub fn template_file(self) -> Option<&'static str> {
        match self {
            ContractModel::New => Some("modelo_novo_base.txt"),
            ContractModel::LegacyV13 => Some("modelo_antigo_base.txt"),
            ContractModel::Unknown => None,
        }
    }

    pub fn is_known(self) -> bool {
        self != ContractModel::Unknown
    }
}

impl fmt::Display for ContractModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "novo" | "new" => Ok(ContractModel::New),
            "antigo_v13" | "legacy_v13" | "v13" => Ok(ContractModel::LegacyV13),
            other => Err(format!(
                "unknown contract model '{}', expected 'novo' or 'antigo_v13'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDetection {
    #[serde(rename = "modelo")]
    pub model: ContractModel,
    #[serde(rename = "confianca")]
    pub confidence: f64,
    #[serde(rename = "marcadores_encontrados")]
    pub markers_found: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractField {
    SchoolName,
    LegalName,
    Cnpj,
    LoginEmail,
    BillingEmail,
    Whatsapp,
    TotalStudents,
    GamifiedStudents,
    SetupFee,
    Subscription,
    OnboardingStart,
    BillingStart,
    CardsSent,
    FirstYearDiscount,
    StoreBalance,
    Ai,
}

impl ContractField {
    pub const ALL: [ContractField; 16] = [
        ContractField::SchoolName,
        ContractField::LegalName,
        ContractField::Cnpj,
        ContractField::LoginEmail,
        ContractField::BillingEmail,
        ContractField::Whatsapp,
        ContractField::TotalStudents,
        ContractField::GamifiedStudents,
        ContractField::SetupFee,
        ContractField::Subscription,
        ContractField::OnboardingStart,
        ContractField::BillingStart,
        ContractField::CardsSent,
        ContractField::FirstYearDiscount,
        ContractField::StoreBalance,
        ContractField::Ai,
    ];

    pub const NUMERIC: [ContractField; 3] = [
        ContractField::TotalStudents,
        ContractField::GamifiedStudents,
        ContractField::SetupFee,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ContractField::SchoolName => "nome_escola",
            ContractField::LegalName => "razao_social",
            ContractField::Cnpj => "cnpj",
            ContractField::LoginEmail => "email_login",
            ContractField::BillingEmail => "email_financeiro",
            ContractField::Whatsapp => "whatsapp",
            ContractField::TotalStudents => "alunos_totais",
            ContractField::GamifiedStudents => "alunos_gamificados",
            ContractField::SetupFee => "implantacao",
            ContractField::Subscription => "assinatura",
            ContractField::OnboardingStart => "inicio_implantacao",
            ContractField::BillingStart => "inicio_cobranca",
            ContractField::CardsSent => "cards_enviados",
            ContractField::FirstYearDiscount => "desconto_primeiro_ano",
            ContractField::StoreBalance => "saldo_loja",
            ContractField::Ai => "ia",
        }
    }

    pub fn is_numeric(self) -> bool {
        Self::NUMERIC.contains(&self)
    }
}

/// Scalar value of a non-numeric contract field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Flag(bool),
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Flag(b) => write!(f, "{}", b),
            FieldValue::Text(t) => f.write_str(t),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractFields {
    #[serde(rename = "nome_escola")]
    pub school_name: Option<FieldValue>,
    #[serde(rename = "razao_social")]
    pub legal_name: Option<FieldValue>,
    pub cnpj: Option<FieldValue>,
    #[serde(rename = "email_login")]
    pub login_email: Option<FieldValue>,
    #[serde(rename = "email_financeiro")]
    pub billing_email: Option<FieldValue>,
    pub whatsapp: Option<FieldValue>,
    #[serde(rename = "alunos_totais")]
    pub total_students: Option<f64>,
    #[serde(rename = "alunos_gamificados")]
    pub gamified_students: Option<f64>,
    #[serde(rename = "implantacao")]
    pub setup_fee: Option<f64>,
    #[serde(rename = "assinatura")]
    pub subscription: Option<FieldValue>,
    #[serde(rename = "inicio_implantacao")]
    pub onboarding_start: Option<FieldValue>,
    #[serde(rename = "inicio_cobranca")]
    pub billing_start: Option<FieldValue>,
    #[serde(rename = "cards_enviados")]
    pub cards_sent: Option<FieldValue>,
    #[serde(rename = "desconto_primeiro_ano")]
    pub first_year_discount: Option<FieldValue>,
    #[serde(rename = "saldo_loja")]
    pub store_balance: Option<FieldValue>,
    #[serde(rename = "ia")]
    pub ai: Option<FieldValue>,
}

impl ContractFields {
    pub fn get(&self, field: ContractField) -> Option<FieldValue> {
        let text = |value: &Option<FieldValue>| value.clone();
        let number = |value: &Option<f64>| value.map(FieldValue::Number);
        match field {
            ContractField::SchoolName => text(&self.school_name),
            ContractField::LegalName => text(&self.legal_name),
            ContractField::Cnpj => text(&self.cnpj),
            ContractField::LoginEmail => text(&self.login_email),
            ContractField::BillingEmail => text(&self.billing_email),
            ContractField::Whatsapp => text(&self.whatsapp),
            ContractField::TotalStudents => number(&self.total_students),
            ContractField::GamifiedStudents => number(&self.gamified_students),
            ContractField::SetupFee => number(&self.setup_fee),
            ContractField::Subscription => text(&self.subscription),
            ContractField::OnboardingStart => text(&self.onboarding_start),
            ContractField::BillingStart => text(&self.billing_start),
            ContractField::CardsSent => text(&self.cards_sent),
            ContractField::FirstYearDiscount => text(&self.first_year_discount),
            ContractField::StoreBalance => text(&self.store_balance),
            ContractField::Ai => text(&self.ai),
        }
    }

    pub fn number(&self, field: ContractField) -> Option<f64> {
        match field {
            ContractField::TotalStudents => self.total_students,
            ContractField::GamifiedStudents => self.gamified_students,
            ContractField::SetupFee => self.setup_fee,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedContract {
    pub model: ContractModel,
    pub data: ContractFields,
}

// ---------------------------------------------------------------------------
// Review results
//
// Serialized with Portuguese keys and values, like the extraction records.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewStatus {
    #[serde(rename = "valido")]
    Valid,
    #[serde(rename = "invalido")]
    Invalid,
    #[serde(rename = "revisao_manual")]
    ManualReview,
}

impl ReviewStatus {
    /// Wire value, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewStatus::Valid => "valido",
            ReviewStatus::Invalid => "invalido",
            ReviewStatus::ManualReview => "revisao_manual",
        }
    }

    /// Human-readable label for reports and pages.
    pub fn label(self) -> &'static str {
        match self {
            ReviewStatus::Valid => "VALID",
            ReviewStatus::Invalid => "INVALID",
            ReviewStatus::ManualReview => "MANUAL REVIEW",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ReviewStatus::Valid => "✔",
            ReviewStatus::Invalid => "✘",
            ReviewStatus::ManualReview => "⚠",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "baixo")]
    Low,
    #[serde(rename = "medio")]
    Medium,
    #[serde(rename = "alto")]
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "baixo",
            RiskLevel::Medium => "medio",
            RiskLevel::High => "alto",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrmValidation {
    pub status: ReviewStatus,
    #[serde(rename = "erros")]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldsValidation {
    #[serde(rename = "valido")]
    pub valid: bool,
    #[serde(rename = "erros_criticos")]
    pub critical_errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClauseValidation {
    #[serde(rename = "valido")]
    pub valid: bool,
    #[serde(rename = "clausulas_alteradas")]
    pub altered_clauses: Vec<String>,
    #[serde(rename = "clausulas_ausentes")]
    pub missing_clauses: Vec<String>,
    #[serde(rename = "clausulas_extras")]
    pub extra_clauses: Vec<String>,
    #[serde(rename = "nivel_risco")]
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileFailure {
    #[serde(rename = "caminho")]
    pub path: String,
    #[serde(rename = "motivo")]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmOutcome {
    #[serde(rename = "sucessos")]
    pub succeeded: Vec<String>,
    #[serde(rename = "falhas")]
    pub failed: Vec<FileFailure>,
    #[serde(rename = "texto")]
    pub text: String,
    #[serde(rename = "dados")]
    pub data: CrmData,
    #[serde(rename = "resultado")]
    pub validation: CrmValidation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractOutcome {
    #[serde(rename = "modelo")]
    pub model: ContractModel,
    #[serde(rename = "dados_extraidos")]
    pub data: ContractFields,
    #[serde(rename = "validacao_campos")]
    pub fields_validation: FieldsValidation,
    #[serde(rename = "validacao_clausulas")]
    pub clause_validation: ClauseValidation,
    #[serde(rename = "status_final")]
    pub final_status: ReviewStatus,
    #[serde(rename = "nivel_risco")]
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewReport {
    pub status: ReviewStatus,
    pub summary: String,
    pub crm: CrmOutcome,
    /// Name of the reviewed contract PDF.
    pub contract_file: String,
    pub contract: ContractOutcome,
    pub generated_at: DateTime<Utc>,
}

/// Request sent to the extraction model.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
}
