use common::NewsItem;

/// Mean sentiment score over the items that carry one.
/// `None` when the feed provided no scored items.
pub fn mean_sentiment(items: &[NewsItem]) -> Option<f64> {
    let scores: Vec<f64> = items.iter().filter_map(|item| item.sentiment).collect();
    if scores.is_empty() {
        return None;
    }
    Some(scores.iter().sum::<f64>() / scores.len() as f64)
}
