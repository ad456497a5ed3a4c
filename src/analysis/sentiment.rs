//! Comment sentiment classification and aggregation.

use serde::Serialize;
use std::collections::HashMap;

use super::stats::percentage;

/// Keywords reported per polarity.
pub const TOP_KEYWORDS: usize = 5;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

pub trait SentimentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Sentiment;

    /// Cue words found in `text`, one entry per occurrence.
    fn cues(&self, _text: &str) -> Vec<(&'static str, Sentiment)> {
        Vec::new()
    }
}

const POSITIVE_CUES: &[&str] = &[
    "性价比高", "高性能", "不错", "优秀", "满意", "推荐", "喜欢", "值得", "流畅", "清晰",
    "漂亮", "强劲", "好", "快", "good", "great", "excellent", "love", "recommend", "fast",
    "smooth", "perfect", "satisfied",
];

const NEGATIVE_CUES: &[&str] = &[
    "不满意", "不好", "不值", "失望", "退货", "卡顿", "问题", "缺点", "发热", "噪音", "差",
    "慢", "贵", "bad", "poor", "slow", "disappointed", "broken", "expensive", "noisy", "lag",
    "refund",
];

/// Keyword lexicon classifier over Chinese and English cue words.
///
/// Negative cues are matched first and masked out, so "不满意" does not also
/// count as "满意". ASCII cues match whole lowercase words; CJK cues match as
/// substrings.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Positive and negative cue hits in `text`.
    #[must_use]
    pub fn cue_counts(&self, text: &str) -> (usize, usize) {
        let cues = self.cues(text);
        let positive = cues
            .iter()
            .filter(|(_, s)| *s == Sentiment::Positive)
            .count();
        (positive, cues.len() - positive)
    }
}

impl SentimentClassifier for LexiconClassifier {
    fn classify(&self, text: &str) -> Sentiment {
        let (positive, negative) = self.cue_counts(text);
        match positive.cmp(&negative) {
            std::cmp::Ordering::Greater => Sentiment::Positive,
            std::cmp::Ordering::Less => Sentiment::Negative,
            std::cmp::Ordering::Equal => Sentiment::Neutral,
        }
    }

    fn cues(&self, text: &str) -> Vec<(&'static str, Sentiment)> {
        let mut remaining = text.to_lowercase();
        let mut hits = Vec::new();

        for &cue in NEGATIVE_CUES {
            let n = count_cue(&remaining, cue);
            if n > 0 {
                hits.extend(std::iter::repeat_n((cue, Sentiment::Negative), n));
                if !cue.is_ascii() {
                    remaining = remaining.replace(cue, " ");
                }
            }
        }

        for &cue in POSITIVE_CUES {
            let n = count_cue(&remaining, cue);
            if n > 0 {
                hits.extend(std::iter::repeat_n((cue, Sentiment::Positive), n));
                if !cue.is_ascii() {
                    remaining = remaining.replace(cue, " ");
                }
            }
        }

        hits
    }
}

fn count_cue(text: &str, cue: &str) -> usize {
    if cue.is_ascii() {
        text.split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|word| *word == cue)
            .count()
    } else {
        text.matches(cue).count()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SentimentBucket {
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SentimentDistribution {
    pub positive: SentimentBucket,
    pub neutral: SentimentBucket,
    pub negative: SentimentBucket,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct SentimentKeywords {
    pub positive: Vec<KeywordCount>,
    pub negative: Vec<KeywordCount>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SentimentFilter {
    pub brand: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SentimentReport {
    pub total_reviews: usize,
    pub sentiment_distribution: SentimentDistribution,
    pub sentiment_score: u32,
    pub keywords: SentimentKeywords,
    pub filter: SentimentFilter,
}

/// Classify every comment and aggregate the distribution and top cue words.
pub fn summarize_sentiment<S: AsRef<str>>(
    comments: &[S],
    classifier: &dyn SentimentClassifier,
    brand: Option<String>,
) -> SentimentReport {
    let mut counts: HashMap<Sentiment, usize> = HashMap::new();
    let mut keyword_hits: HashMap<(&'static str, Sentiment), usize> = HashMap::new();

    for comment in comments {
        let text = comment.as_ref();
        *counts.entry(classifier.classify(text)).or_default() += 1;
        for cue in classifier.cues(text) {
            *keyword_hits.entry(cue).or_default() += 1;
        }
    }

    let total = comments.len();
    let bucket = |s: Sentiment| {
        let count = counts.get(&s).copied().unwrap_or_default();
        SentimentBucket {
            count,
            percentage: percentage(count, total),
        }
    };

    let positive = bucket(Sentiment::Positive);
    let sentiment_score = if total == 0 {
        0
    } else {
        u32::try_from(positive.count * 100 / total).unwrap_or(100)
    };

    SentimentReport {
        total_reviews: total,
        sentiment_distribution: SentimentDistribution {
            positive,
            neutral: bucket(Sentiment::Neutral),
            negative: bucket(Sentiment::Negative),
        },
        sentiment_score,
        keywords: SentimentKeywords {
            positive: top_keywords(&keyword_hits, Sentiment::Positive),
            negative: top_keywords(&keyword_hits, Sentiment::Negative),
        },
        filter: SentimentFilter { brand },
    }
}

fn top_keywords(
    hits: &HashMap<(&'static str, Sentiment), usize>,
    polarity: Sentiment,
) -> Vec<KeywordCount> {
    let mut rows: Vec<KeywordCount> = hits
        .iter()
        .filter(|((_, s), _)| *s == polarity)
        .map(|((keyword, _), count)| KeywordCount {
            keyword: (*keyword).to_string(),
            count: *count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.keyword.cmp(&b.keyword)));
    rows.truncate(TOP_KEYWORDS);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexicon_classify() {
        let c = LexiconClassifier::new();
        assert_eq!(c.classify("性能很好，非常满意，推荐购买"), Sentiment::Positive);
        assert_eq!(c.classify("太卡顿了，很失望，准备退货"), Sentiment::Negative);
        assert_eq!(c.classify("今天收到了"), Sentiment::Neutral);
        assert_eq!(c.classify("Great laptop, fast and smooth"), Sentiment::Positive);
        assert_eq!(c.classify("Screen arrived broken, bad support"), Sentiment::Negative);
    }

    #[test]
    fn test_negated_phrase_not_counted_as_positive() {
        let c = LexiconClassifier::new();
        assert_eq!(c.cue_counts("不满意"), (0, 1));
        assert_eq!(c.classify("屏幕不好"), Sentiment::Negative);
    }

    #[test]
    fn test_summary_counts_sum_to_total() {
        let comments = vec![
            "很好，推荐",
            "一般般",
            "太慢了",
            "不错，值得",
            "screen is great",
        ];
        let report = summarize_sentiment(&comments, &LexiconClassifier, Some("Lenovo".into()));
        let dist = &report.sentiment_distribution;
        assert_eq!(report.total_reviews, 5);
        assert_eq!(
            dist.positive.count + dist.neutral.count + dist.negative.count,
            report.total_reviews
        );
        assert_eq!(dist.positive.count, 3);
        assert_eq!(dist.negative.count, 1);
        assert_eq!(report.sentiment_score, 60);
        assert!(!report.keywords.positive.is_empty());
        assert_eq!(report.keywords.negative[0].keyword, "慢");
    }

    #[test]
    fn test_summary_without_comments() {
        let empty: Vec<String> = Vec::new();
        let report = summarize_sentiment(&empty, &LexiconClassifier, None);
        assert_eq!(report.total_reviews, 0);
        assert_eq!(report.sentiment_score, 0);
        assert!(report.sentiment_distribution.positive.percentage.abs() < f64::EPSILON);
        assert!(report.keywords.positive.is_empty());
    }
}
