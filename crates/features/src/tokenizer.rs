//! Turning movie records into token streams.
//!
//! A movie's content document is its overview followed by its genre labels.
//! The title is not part of the document.
//!
//! Tokens are maximal runs of alphanumeric characters, lowercased. Tokens
//! shorter than `min_term_len` and (optionally) stop words are dropped.

use crate::config::FeatureConfig;
use data_loader::MovieRecord;

/// Common English function words, sorted for binary search
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "almost", "alone",
    "along", "already", "also", "although", "always", "am", "among", "an", "and",
    "another", "any", "anyone", "anything", "are", "around", "as", "at", "back",
    "be", "became", "because", "become", "becomes", "been", "before", "being",
    "below", "between", "both", "but", "by", "can", "cannot", "could", "did", "do",
    "does", "doing", "done", "down", "during", "each", "either", "else", "even",
    "ever", "every", "few", "for", "from", "further", "get", "gets", "got", "had",
    "has", "have", "having", "he", "her", "here", "hers", "herself", "him",
    "himself", "his", "how", "however", "i", "if", "in", "into", "is", "it", "its",
    "itself", "just", "least", "less", "many", "may", "me", "might", "more",
    "most", "much", "must", "my", "myself", "neither", "never", "no", "nobody",
    "none", "nor", "not", "nothing", "now", "of", "off", "often", "on", "once",
    "one", "only", "or", "other", "others", "our", "ours", "ourselves", "out",
    "over", "own", "per", "perhaps", "please", "put", "rather", "same", "see",
    "seem", "seemed", "seems", "several", "she", "should", "since", "so", "some",
    "something", "still", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "though",
    "through", "thus", "to", "too", "toward", "towards", "under", "until", "up",
    "upon", "us", "very", "via", "was", "we", "well", "were", "what", "whatever",
    "when", "where", "whether", "which", "while", "who", "whoever", "whom",
    "whose", "why", "will", "with", "within", "without", "would", "yet", "you",
    "your", "yours", "yourself", "yourselves",
];

/// Whether a lowercased token is an English stop word
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.binary_search(&token).is_ok()
}

/// Build the content document for one movie
///
/// Example: overview `"space battle"`, genres `["Action"]` -> `"space battle Action"`
pub fn content_document(movie: &MovieRecord) -> String {
    let mut document = movie.overview.clone();
    for genre in &movie.genres {
        if !document.is_empty() {
            document.push(' ');
        }
        document.push_str(genre);
    }
    document
}

/// Split text into normalised terms according to `config`
///
/// Order is preserved and repeats are kept; counting happens later.
pub fn tokenize(text: &str, config: &FeatureConfig) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|raw| !raw.is_empty() && raw.chars().count() >= config.min_term_len)
        .map(str::to_lowercase)
        .filter(|token| !(config.stop_words && is_stop_word(token)))
        .collect()
}

/// Tokenize a movie's content document
pub fn tokenize_movie(movie: &MovieRecord, config: &FeatureConfig) -> Vec<String> {
    tokenize(&content_document(movie), config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_words_sorted() {
        assert!(STOP_WORDS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_tokenize_basic() {
        let config = FeatureConfig::default();
        let tokens = tokenize("The Space-Battle of a lifetime, in 3D!", &config);
        assert_eq!(tokens, vec!["space", "battle", "lifetime", "3d"]);
    }

    #[test]
    fn test_tokenize_without_stop_words() {
        let config = FeatureConfig::default().with_stop_words(false);
        let tokens = tokenize("the war", &config);
        assert_eq!(tokens, vec!["the", "war"]);
    }

    #[test]
    fn test_tokenize_min_length() {
        let config = FeatureConfig::default().with_min_term_len(4);
        let tokens = tokenize("war fleet saga", &config);
        assert_eq!(tokens, vec!["fleet", "saga"]);
    }

    #[test]
    fn test_tokenize_zero_min_length_skips_empty_pieces() {
        let config = FeatureConfig {
            min_term_len: 0,
            ..FeatureConfig::default()
        };
        assert_eq!(tokenize("space battle.", &config), vec!["space", "battle"]);
        assert!(tokenize("", &config).is_empty());
        assert!(tokenize(" -- ", &config).is_empty());
    }

    #[test]
    fn test_tokenize_unicode() {
        let config = FeatureConfig::default();
        assert_eq!(tokenize("Amélie à Paris", &config), vec!["amélie", "paris"]);
    }

    #[test]
    fn test_content_document_excludes_title() {
        let movie = MovieRecord::new(1, "Unique Title")
            .with_overview("space battle")
            .with_genres(["Action", "Science Fiction"]);
        assert_eq!(content_document(&movie), "space battle Action Science Fiction");
    }

    #[test]
    fn test_content_document_empty() {
        let movie = MovieRecord::new(1, "Nothing");
        assert_eq!(content_document(&movie), "");
        assert!(tokenize_movie(&movie, &FeatureConfig::default()).is_empty());

        let genre_only = MovieRecord::new(2, "Genre Only").with_genres(["Drama"]);
        assert_eq!(content_document(&genre_only), "Drama");
    }
}
