use std::str::FromStr;

use super::Config;

/// First set variable among `keys`, in order.
fn first_var(keys: &[&str]) -> Option<(String, String)> {
    keys.iter()
        .find_map(|k| std::env::var(k).ok().map(|v| ((*k).to_owned(), v)))
}

fn parse_var<T: FromStr>(keys: &[&str]) -> Option<T> {
    let (key, raw) = first_var(keys)?;
    if let Ok(v) = raw.trim().parse() {
        Some(v)
    } else {
        tracing::warn!("ignoring invalid {key} value: {raw}");
        None
    }
}

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Some((_, v)) = first_var(&["DOCENT_LLM_BASE_URL"]) {
            self.llm.base_url = v;
        }
        if let Some((_, v)) = first_var(&["DOCENT_LLM_MODEL", "OPENAI_LLM_MODEL"]) {
            self.llm.model = v;
        }
        if let Some((_, v)) = first_var(&["DOCENT_LLM_EMBEDDING_MODEL", "OPENAI_EMBEDDING_MODEL"])
        {
            self.llm.embedding_model = v;
        }
        if let Some((_, v)) = first_var(&["DOCENT_DATA_DIR"]) {
            self.storage.data_dir = v;
        }
        if let Some((_, v)) = first_var(&["DOCENT_INDEX_DIR"]) {
            self.storage.index_dir = v;
        }
        if let Some(n) = parse_var(&["DOCENT_MAX_QUERIES", "MAX_QUERIES"]) {
            self.session.max_queries = n;
        }
        if let Some(k) = parse_var(&["DOCENT_TOP_K"]) {
            self.retrieval.top_k = k;
        }
        if let Some((_, v)) = first_var(&["DOCENT_GATEWAY_BIND"]) {
            self.gateway.bind = v;
        }
        if let Some(port) = parse_var(&["DOCENT_GATEWAY_PORT"]) {
            self.gateway.port = port;
        }
        if let Some((_, v)) = first_var(&["DOCENT_GATEWAY_AUTH_TOKEN"]) {
            self.gateway.auth_token = Some(v);
        }
    }
}
