//! Registry of hosted rerank models and their request limits.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RerankModelSpec {
    pub name: &'static str,
    /// Maximum documents accepted in one request
    pub max_documents: usize,
    /// Maximum tokens per query + document pair
    pub max_tokens_per_pair: usize,
    /// Whether more than one rank field may be supplied
    pub multiple_rank_fields: bool,
}

const BGE_RERANKER_V2_M3: &str = "bge-reranker-v2-m3";
const PINECONE_RERANK_V0: &str = "pinecone-rerank-v0";
const COHERE_RERANK_3_5: &str = "cohere-rerank-3.5";

pub fn rerank_model_spec(model: &str) -> Option<RerankModelSpec> {
    match model {
        BGE_RERANKER_V2_M3 => Some(RerankModelSpec {
            name: BGE_RERANKER_V2_M3,
            max_documents: 100,
            max_tokens_per_pair: 1024,
            multiple_rank_fields: false,
        }),
        PINECONE_RERANK_V0 => Some(RerankModelSpec {
            name: PINECONE_RERANK_V0,
            max_documents: 100,
            max_tokens_per_pair: 512,
            multiple_rank_fields: false,
        }),
        COHERE_RERANK_3_5 => Some(RerankModelSpec {
            name: COHERE_RERANK_3_5,
            max_documents: 200,
            max_tokens_per_pair: 40_000,
            multiple_rank_fields: true,
        }),
        _ => None,
    }
}

pub fn supported_rerank_models() -> Vec<&'static str> {
    vec![BGE_RERANKER_V2_M3, PINECONE_RERANK_V0, COHERE_RERANK_3_5]
}

pub fn is_known_rerank_model(model: &str) -> bool {
    rerank_model_spec(model).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_models() {
        let spec = rerank_model_spec(BGE_RERANKER_V2_M3).unwrap();
        assert_eq!(spec.max_documents, 100);
        assert!(!spec.multiple_rank_fields);

        let spec = rerank_model_spec(COHERE_RERANK_3_5).unwrap();
        assert!(spec.multiple_rank_fields);
    }

    #[test]
    fn test_unknown_model() {
        assert!(rerank_model_spec("test-model").is_none());
        assert!(!is_known_rerank_model("test-model"));
    }

    #[test]
    fn test_supported_list_resolves() {
        for name in supported_rerank_models() {
            assert_eq!(rerank_model_spec(name).unwrap().name, name);
        }
    }
}
