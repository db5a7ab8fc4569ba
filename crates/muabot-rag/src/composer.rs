//! Rule-based response composition.
//!
//! No text is generated: the reply is either a retrieved passage selected by
//! intent, or one of the fixed fallback messages below.

use crate::intent::{Intent, IntentRules};
use crate::retriever::Retrieved;

/// Reply when retrieval found nothing to ground an answer on.
pub const NO_CONTEXT_REPLY: &str = "Xin lỗi, tôi không tìm thấy thông tin liên quan đến câu hỏi của bạn. Vui lòng thử lại với câu hỏi khác hoặc liên hệ bộ phận hỗ trợ.";
/// Prefix for every price answer.
pub const PRICE_PREFIX: &str = "Dựa trên thông tin sản phẩm, ";
/// Price answer when no retrieved document carries a price.
pub const PRICE_FALLBACK: &str = "vui lòng xem chi tiết giá trên trang sản phẩm.";
/// Fixed availability reply; retrieved content is never consulted.
pub const AVAILABILITY_REPLY: &str =
    "Sản phẩm hiện đang có sẵn. Bạn có thể đặt hàng ngay bây giờ!";
/// Description fallback for an empty result set.
pub const NO_DESCRIPTION_REPLY: &str = "Xin lỗi, tôi chưa có thông tin về điều này.";
/// Default fallback when the intent is unrecognized and nothing was retrieved.
pub const UNCLEAR_REPLY: &str = "Xin lỗi, tôi chưa hiểu câu hỏi của bạn. Vui lòng hỏi lại.";

/// Cited sources never exceed this many entries.
pub const MAX_SOURCES: usize = 3;

/// A cited source: retrieved text plus `relevance = 1 - distance`.
#[derive(Debug, Clone)]
pub struct CitedSource {
    pub id: String,
    pub text: String,
    pub metadata: std::collections::HashMap<String, serde_json::Value>,
    pub relevance: f32,
}

/// A composed reply and the sources that grounded it.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub response: String,
    pub sources: Vec<CitedSource>,
}

/// Deterministic intent-dispatched response selection.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    rules: IntentRules,
}

impl Composer {
    #[must_use]
    pub fn new(rules: IntentRules) -> Self {
        Self { rules }
    }

    /// Compose a reply for `message` from the ranked `retrieved` documents.
    ///
    /// Rules run in fixed priority order against the lower-cased message,
    /// first match wins. The availability rule ignores retrieved content
    /// entirely and is therefore honored even on an empty result set; every
    /// other path short-circuits to [`NO_CONTEXT_REPLY`] when retrieval came
    /// back empty.
    #[must_use]
    pub fn compose(&self, message: &str, retrieved: &[Retrieved]) -> ChatReply {
        let intent = self.rules.detect(message);

        if retrieved.is_empty() && intent != Some(Intent::Availability) {
            return ChatReply {
                response: NO_CONTEXT_REPLY.into(),
                sources: Vec::new(),
            };
        }

        let response = match intent {
            Some(Intent::Price) => self.price_response(retrieved),
            Some(Intent::Description) => retrieved
                .first()
                .map_or_else(|| NO_DESCRIPTION_REPLY.into(), |doc| doc.text.clone()),
            Some(Intent::Availability) => AVAILABILITY_REPLY.into(),
            None => retrieved
                .first()
                .map_or_else(|| UNCLEAR_REPLY.into(), |doc| doc.text.clone()),
        };

        let sources = retrieved
            .iter()
            .take(MAX_SOURCES)
            .map(|doc| CitedSource {
                id: doc.id.clone(),
                text: doc.text.clone(),
                metadata: doc.metadata.clone(),
                relevance: 1.0 - doc.distance,
            })
            .collect();

        ChatReply { response, sources }
    }

    /// First document in rank order whose metadata carries a price or whose
    /// text mentions a price keyword; generic pricing pointer otherwise.
    fn price_response(&self, retrieved: &[Retrieved]) -> String {
        let keywords = self.rules.keywords_for(Intent::Price);
        let priced = retrieved.iter().find(|doc| {
            if doc.metadata.contains_key("price") {
                return true;
            }
            let text = doc.text.to_lowercase();
            keywords.iter().any(|kw| text.contains(kw.as_str()))
        });
        match priced {
            Some(doc) => format!("{PRICE_PREFIX}{}", doc.text),
            None => format!("{PRICE_PREFIX}{PRICE_FALLBACK}"),
        }
    }
}
