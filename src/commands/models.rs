//! Known rerank models listing

use crate::models::{rerank_model_spec, supported_rerank_models, RerankModelSpec};

/// Specs for every known rerank model, in registry order
pub fn cmd_models() -> Vec<RerankModelSpec> {
    supported_rerank_models()
        .into_iter()
        .filter_map(rerank_model_spec)
        .collect()
}

/// Print known rerank models to console
pub fn print_models(models: &[RerankModelSpec]) {
    println!("\nKnown rerank models:\n");
    println!(
        "{:<22} {:>10} {:>12} {:>14}",
        "MODEL", "MAX DOCS", "MAX TOKENS", "RANK FIELDS"
    );

    for spec in models {
        let fields = if spec.multiple_rank_fields {
            "multiple"
        } else {
            "single"
        };
        println!(
            "{:<22} {:>10} {:>12} {:>14}",
            spec.name, spec.max_documents, spec.max_tokens_per_pair, fields
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_models_lists_registry() {
        let models = cmd_models();
        assert_eq!(models.len(), supported_rerank_models().len());
        assert!(models.iter().any(|m| m.name == "bge-reranker-v2-m3"));
    }
}
