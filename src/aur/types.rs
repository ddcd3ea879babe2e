use serde::Deserialize;

/// One row of a search response. The index capitalizes its JSON keys.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "NumVotes")]
    pub num_votes: u64,
    #[serde(rename = "Description")]
    pub description: Option<String>,
}

/// Envelope of the search RPC.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchResponse {
    pub resultcount: u64,
    pub results: Vec<SearchResult>,
}
