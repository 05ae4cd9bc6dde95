//! Ready-made text-processing and road-graph pipelines.

use crate::operator::JoinKind;
use crate::ops::{
    Count, CountPerRow, EdgeLength, Filter, FilterPunctuation, First, Idf, LowerCase, Pmi,
    Product, Project, RowCount, Speed, Split, Sum, TermFrequency, TopN, TravelTime,
};
use crate::{Graph, Row};

const DOC_COUNT: &str = "doc_count";
const DOCS_WITH_WORD: &str = "docs_with_word";
const TF: &str = "tf";
const IDF: &str = "idf";

const OCCURRENCES: &str = "occurrences";
const DOC_TF: &str = "doc_tf";
const TOTAL_TF: &str = "total_tf";
const PMI_MIN_WORD_LEN: usize = 5;
const PMI_MIN_OCCURRENCES: i64 = 2;
const PMI_TOP: usize = 10;

const LENGTH_KM: &str = "length_km";
const DURATION_S: &str = "duration_s";

/// Count word occurrences over all rows of `input`.
///
/// Emits `{text_column, count_column}` rows sorted by count, then word.
pub fn word_count_graph(input: &str, text_column: &str, count_column: &str) -> Graph {
    Graph::from_source(input)
        .map(FilterPunctuation::new(text_column))
        .map(LowerCase::new(text_column))
        .map(Split::new(text_column))
        .sort(&[text_column])
        .reduce(Count::new(count_column), &[text_column])
        .sort(&[count_column, text_column])
}

/// For every word, the three documents with the highest TF-IDF score.
///
/// Emits `{doc_column, text_column, result_column}` rows grouped by word in
/// ascending word order, highest score first within a word.
pub fn inverted_index_graph(
    input: &str,
    doc_column: &str,
    text_column: &str,
    result_column: &str,
) -> Graph {
    let words = Graph::from_source(input)
        .map(FilterPunctuation::new(text_column))
        .map(LowerCase::new(text_column))
        .map(Split::new(text_column));

    let doc_count = Graph::from_source(input).fold(RowCount::new(DOC_COUNT), Row::new());

    let idf = words
        .sort(&[doc_column, text_column])
        .reduce(First, &[doc_column, text_column])
        .sort(&[text_column])
        .reduce(Count::new(DOCS_WITH_WORD), &[text_column])
        .join(JoinKind::Inner, &doc_count, &[] as &[&str])
        .map(Idf::new(DOC_COUNT, DOCS_WITH_WORD, text_column, IDF));

    let tf = words
        .sort(&[doc_column])
        .reduce(TermFrequency::new(text_column, TF), &[doc_column])
        .sort(&[text_column]);

    tf.join(JoinKind::Inner, &idf, &[text_column])
        .map(Product::new(&[TF, IDF], result_column))
        .map(Project::new(&[doc_column, text_column, result_column]))
        .reduce(TopN::new(result_column, 3), &[text_column])
}

/// For every document, the ten words with the highest pointwise mutual
/// information.
///
/// Only words of at least five characters that occur at least twice in a
/// document are considered. PMI is `ln(freq in doc / freq over all docs)`,
/// both frequencies taken over the considered occurrences. Emits
/// `{doc_column, text_column, result_column}` rows in ascending document order,
/// highest PMI first within a document.
pub fn pmi_graph(input: &str, doc_column: &str, text_column: &str, result_column: &str) -> Graph {
    let word = text_column.to_string();
    let frequent = Graph::from_source(input)
        .map(FilterPunctuation::new(text_column))
        .map(LowerCase::new(text_column))
        .map(Split::new(text_column))
        .map(Filter::new(move |row: &Row| {
            row.get_str(&word)
                .map(|w| w.chars().count() >= PMI_MIN_WORD_LEN)
                .unwrap_or(false)
        }))
        .sort(&[doc_column, text_column])
        .reduce(CountPerRow::new(OCCURRENCES), &[doc_column, text_column])
        .map(Filter::new(|row: &Row| {
            row.get_opt(OCCURRENCES)
                .and_then(|n| n.as_i64())
                .is_some_and(|n| n >= PMI_MIN_OCCURRENCES)
        }));

    // Sorted by (doc, word), so already grouped by doc.
    let doc_tf = frequent
        .reduce(TermFrequency::new(text_column, DOC_TF), &[doc_column])
        .sort(&[text_column]);
    let total_tf = frequent
        .reduce(TermFrequency::new(text_column, TOTAL_TF), &[] as &[&str])
        .sort(&[text_column]);

    doc_tf
        .join(JoinKind::Inner, &total_tf, &[text_column])
        .map(Pmi::new(DOC_TF, TOTAL_TF, result_column))
        .map(Project::new(&[doc_column, text_column, result_column]))
        .sort(&[doc_column])
        .reduce(TopN::new(result_column, PMI_TOP), &[doc_column])
}

/// Column names read and written by [`average_speed_graph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeedColumns {
    /// Travel-time input: timestamp the edge was entered.
    pub enter_time: String,
    /// Travel-time input: timestamp the edge was left.
    pub leave_time: String,
    /// Edge id shared by both inputs.
    pub edge_id: String,
    /// Edge input: `[lon, lat]` of the edge start.
    pub start: String,
    /// Edge input: `[lon, lat]` of the edge end.
    pub end: String,
    /// Output: abbreviated weekday of the enter time.
    pub weekday: String,
    /// Output: hour of the enter time.
    pub hour: String,
    /// Output: average speed in km/h.
    pub speed: String,
}

impl Default for SpeedColumns {
    fn default() -> Self {
        Self {
            enter_time: "enter_time".to_string(),
            leave_time: "leave_time".to_string(),
            edge_id: "edge_id".to_string(),
            start: "start".to_string(),
            end: "end".to_string(),
            weekday: "weekday".to_string(),
            hour: "hour".to_string(),
            speed: "speed".to_string(),
        }
    }
}

/// Average road speed per weekday and hour.
///
/// `travel_times` rows carry an edge id and enter/leave timestamps; `edges` rows
/// carry an edge id and its start/end coordinates. Speed for a (weekday, hour)
/// slot is total length over total time of every traversal entered in that
/// slot. Emits `{weekday, hour, speed}` rows sorted by weekday name, then hour.
pub fn average_speed_graph(travel_times: &str, edges: &str, columns: &SpeedColumns) -> Graph {
    let c = columns;
    let lengths = Graph::from_source(edges)
        .map(EdgeLength::new(&c.start, &c.end, LENGTH_KM))
        .map(Project::new(&[c.edge_id.as_str(), LENGTH_KM]))
        .sort(&[&c.edge_id]);

    let slot = [c.weekday.as_str(), c.hour.as_str()];
    Graph::from_source(travel_times)
        .map(TravelTime::new(
            &c.enter_time,
            &c.leave_time,
            DURATION_S,
            &c.weekday,
            &c.hour,
        ))
        .map(Project::new(&[
            c.edge_id.as_str(),
            DURATION_S,
            c.weekday.as_str(),
            c.hour.as_str(),
        ]))
        .sort(&[&c.edge_id])
        .join(JoinKind::Inner, &lengths, &[&c.edge_id])
        .sort(&slot)
        .reduce(Sum::new(&[LENGTH_KM, DURATION_S]), &slot)
        .map(Speed::new(LENGTH_KM, DURATION_S, &c.speed))
        .map(Project::new(&[
            c.weekday.as_str(),
            c.hour.as_str(),
            c.speed.as_str(),
        ]))
}
