use crate::domain::model::{ContractModel, ModelDetection};

pub const CONFIDENCE_FOUND: f64 = 0.95;
pub const CONFIDENCE_AMBIGUOUS: f64 = 0.5;
pub const CONFIDENCE_UNKNOWN: f64 = 0.0;

/// Textual markers that identify each official contract template.
pub const MARKERS: &[(ContractModel, &[&str])] = &[
    (
        ContractModel::New,
        &[
            "ANEXO 1 - TABELA RESUMO COMERCIAL",
            "CONTRATO DE ASSINATURA DE SOFTWARE (SaaS)",
        ],
    ),
    (
        ContractModel::LegacyV13,
        &["saldo em loja", "Contrato Escolas v13"],
    ),
];

/// Detects which template a contract was written from. Plain substring
/// search, case-insensitive; markers of both templates make it ambiguous.
pub fn detect_model(text: &str) -> ModelDetection {
    let lower = text.to_lowercase();

    let mut matched_models = Vec::new();
    let mut markers_found = Vec::new();

    for (model, markers) in MARKERS {
        let found: Vec<String> = markers
            .iter()
            .filter(|marker| lower.contains(&marker.to_lowercase()))
            .map(|marker| marker.to_string())
            .collect();

        if !found.is_empty() {
            matched_models.push(*model);
            markers_found.extend(found);
        }
    }

    let (model, confidence) = match matched_models.as_slice() {
        [single] => (*single, CONFIDENCE_FOUND),
        [] => (ContractModel::Unknown, CONFIDENCE_UNKNOWN),
        _ => (ContractModel::Unknown, CONFIDENCE_AMBIGUOUS),
    };

    tracing::debug!(
        "Contract model detection: {} (confidence {}, markers {:?})",
        model,
        confidence,
        markers_found
    );

    ModelDetection {
        model,
        confidence,
        markers_found,
    }
}
