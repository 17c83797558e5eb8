//! Tooltip content for `cs` and `csymbol` nodes.

use serde::Serialize;
use serde_json::Value;

pub const LOADING_FAILED: &str = "Loading failed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tooltip {
    pub content: String,
    pub visible: bool,
}

impl Tooltip {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            visible: false,
        }
    }
}

/// Source of symbol metadata for `csymbol` nodes.
pub trait TooltipProvider {
    /// Content directory name shown while a lookup is pending.
    fn content_directory(&self) -> &str;

    fn lookup_url(&self, symbol: &str) -> String;

    /// Tooltip content for a successful lookup.
    fn render(&self, symbol: &str, metadata: &Value) -> String;

    fn pending_content(&self, symbol: &str) -> String {
        format!(
            "Fetching information for symbol {symbol} from content directory {}.",
            self.content_directory()
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WikidataTooltips;

impl TooltipProvider for WikidataTooltips {
    fn content_directory(&self) -> &str {
        "wikidata"
    }

    fn lookup_url(&self, symbol: &str) -> String {
        format!("http://www.wikidata.org/wiki/Special:EntityData/{symbol}.json")
    }

    fn render(&self, symbol: &str, metadata: &Value) -> String {
        let entity = &metadata["entities"][symbol];
        let label = entity["labels"]["en"]["value"].as_str().unwrap_or(symbol);
        let description = entity["descriptions"]["en"]["value"]
            .as_str()
            .unwrap_or("no description");
        format!(
            "<h3><a href=\"https://wikidata.org/wiki/{symbol}\" target=\"_blank\">Wikidata {symbol}</a></h3>\
             <p>{label}</p><p>{description}</p>"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wikidata_renders_label_and_description() {
        let meta = json!({
            "entities": {
                "Q11348": {
                    "labels": { "en": { "value": "function" } },
                    "descriptions": { "en": { "value": "association of outputs to inputs" } }
                }
            }
        });
        let html = WikidataTooltips.render("Q11348", &meta);
        assert!(html.contains(r#"href="https://wikidata.org/wiki/Q11348""#));
        assert!(html.contains("<p>function</p>"));
        assert!(html.contains("<p>association of outputs to inputs</p>"));
    }

    #[test]
    fn wikidata_falls_back_to_symbol_and_no_description() {
        let html = WikidataTooltips.render("Q1", &json!({}));
        assert!(html.contains("<p>Q1</p>"));
        assert!(html.contains("<p>no description</p>"));
        assert_eq!(
            WikidataTooltips.pending_content("Q1"),
            "Fetching information for symbol Q1 from content directory wikidata."
        );
        assert_eq!(
            WikidataTooltips.lookup_url("Q1"),
            "http://www.wikidata.org/wiki/Special:EntityData/Q1.json"
        );
    }
}
