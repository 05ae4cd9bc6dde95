pub mod cli;
pub mod error;

use std::io::Write;

use alopex_dataflow::graphs::{
    average_speed_graph, inverted_index_graph, pmi_graph, word_count_graph, SpeedColumns,
};
use alopex_dataflow::io::{jsonl_source, write_jsonl_to};
use alopex_dataflow::{Graph, Sources};

use cli::{Cli, Experiment};
use error::{CliError, Result};

const INPUT_SLOT: &str = "input";
const EDGES_SLOT: &str = "edges";

/// Build the pipeline selected on the command line.
pub fn build_graph(cli: &Cli) -> Graph {
    match cli.experiment {
        Experiment::WordCount => word_count_graph(INPUT_SLOT, &cli.text_column, "count"),
        Experiment::TfIdf => {
            inverted_index_graph(INPUT_SLOT, &cli.doc_column, &cli.text_column, "tf_idf")
        }
        Experiment::Pmi => pmi_graph(INPUT_SLOT, &cli.doc_column, &cli.text_column, "pmi"),
        Experiment::AverageSpeed => {
            average_speed_graph(INPUT_SLOT, EDGES_SLOT, &SpeedColumns::default())
        }
    }
}

fn bind_sources<'a>(cli: &'a Cli) -> Result<Sources<'a>> {
    let sources = Sources::new().with_source(INPUT_SLOT, jsonl_source(&cli.input));
    match (cli.experiment, &cli.edges) {
        (Experiment::AverageSpeed, Some(edges)) => {
            Ok(sources.with_source(EDGES_SLOT, jsonl_source(edges)))
        }
        (Experiment::AverageSpeed, None) => Err(CliError::InvalidArgument(
            "--edges is required for average-speed".to_string(),
        )),
        _ => Ok(sources),
    }
}

/// Run the selected pipeline and write its rows to `out` as JSON lines.
///
/// Returns the number of rows written.
pub fn run<W: Write>(cli: &Cli, mut out: W) -> Result<usize> {
    if cli.limit == Some(0) {
        return Err(CliError::InvalidArgument(
            "--limit must be greater than zero".to_string(),
        ));
    }

    let graph = build_graph(cli);
    if cli.explain {
        out.write_all(graph.explain().as_bytes())?;
        out.flush()?;
        return Ok(0);
    }

    let sources = bind_sources(cli)?;
    let limit = cli.limit.unwrap_or(usize::MAX);
    tracing::info!(
        experiment = ?cli.experiment,
        input = %cli.input.display(),
        eager = cli.eager,
        "running experiment"
    );

    let written = if cli.eager {
        let rows = graph.run(&sources)?;
        write_jsonl_to(out, rows.into_iter().take(limit).map(Ok))?
    } else {
        write_jsonl_to(out, graph.run_iter(&sources)?.take(limit))?
    };

    tracing::info!(rows = written, "experiment finished");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::Parser;
    use tempfile::TempDir;

    use super::run;
    use crate::cli::Cli;
    use crate::error::CliError;

    fn corpus() -> (TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.jsonl");
        std::fs::write(
            &path,
            concat!(
                "{\"doc_id\": 1, \"text\": \"a b a\"}\n",
                "{\"doc_id\": 2, \"text\": \"b c\"}\n",
                "\n",
                "{\"doc_id\": 3, \"text\": \"a\"}\n",
            ),
        )
        .unwrap();
        (dir, path)
    }

    fn cli(input: &Path, extra: &[&str]) -> Cli {
        let mut args = vec![
            "alopex-dataflow".to_string(),
            "--input".to_string(),
            input.display().to_string(),
        ];
        args.extend(extra.iter().map(|s| s.to_string()));
        Cli::try_parse_from(args).unwrap()
    }

    fn output(cli: &Cli) -> (usize, String) {
        let mut buf = Vec::new();
        let n = run(cli, &mut buf).unwrap();
        (n, String::from_utf8(buf).unwrap())
    }

    #[test]
    fn word_count_streams_json_lines() {
        let (_dir, path) = corpus();
        let (n, text) = output(&cli(&path, &["--experiment", "word-count"]));
        assert_eq!(n, 3);
        assert_eq!(
            text,
            "{\"count\":1,\"text\":\"c\"}\n{\"count\":2,\"text\":\"b\"}\n{\"count\":3,\"text\":\"a\"}\n"
        );
    }

    #[test]
    fn limit_truncates_and_eager_matches_lazy() {
        let (_dir, path) = corpus();
        let lazy = output(&cli(&path, &["--experiment", "tf-idf", "--limit", "2"]));
        let eager = output(&cli(
            &path,
            &["--experiment", "tf-idf", "--limit", "2", "--eager"],
        ));
        assert_eq!(lazy.0, 2);
        assert_eq!(lazy, eager);
    }

    #[test]
    fn explain_does_not_read_the_input() {
        let cli = cli(
            Path::new("/does/not/exist.jsonl"),
            &["--experiment", "word-count", "--explain"],
        );
        let (n, text) = output(&cli);
        assert_eq!(n, 0);
        assert!(text.starts_with("sort by=[count, text]"));
        assert!(text.contains("source[input]"));
    }

    #[test]
    fn zero_limit_is_rejected() {
        let (_dir, path) = corpus();
        let cli = cli(&path, &["--experiment", "word-count", "--limit", "0"]);
        assert!(matches!(
            run(&cli, Vec::new()),
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[test]
    fn missing_input_is_a_dataflow_error() {
        let cli = cli(
            Path::new("/does/not/exist.jsonl"),
            &["--experiment", "word-count"],
        );
        assert!(matches!(run(&cli, Vec::new()), Err(CliError::Dataflow(_))));
    }

    #[test]
    fn pmi_runs_over_the_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.jsonl");
        std::fs::write(
            &path,
            concat!(
                "{\"doc_id\": 1, \"text\": \"hello hello world world world\"}\n",
                "{\"doc_id\": 2, \"text\": \"hello hello hello little little\"}\n",
            ),
        )
        .unwrap();
        let (n, text) = output(&cli(&path, &["--experiment", "pmi"]));
        assert_eq!(n, 4);
        let first = text.lines().next().unwrap();
        assert!(first.starts_with("{\"doc_id\":1,\"pmi\":"));
        assert!(first.ends_with("\"text\":\"world\"}"));
    }

    #[test]
    fn average_speed_joins_the_edges_file() {
        let dir = tempfile::tempdir().unwrap();
        let times = dir.path().join("times.jsonl");
        let edges = dir.path().join("edges.jsonl");
        std::fs::write(
            &times,
            "{\"edge_id\": 7, \"enter_time\": \"20171011T145551.957000\", \"leave_time\": \"20171011T145553.040000\"}\n",
        )
        .unwrap();
        std::fs::write(
            &edges,
            "{\"edge_id\": 7, \"start\": [37.84870228730142, 55.73853974696249], \"end\": [37.8490418381989, 55.73832445777953]}\n",
        )
        .unwrap();

        let edges_arg = edges.display().to_string();
        let (n, text) = output(&cli(
            &times,
            &["--experiment", "average-speed", "--edges", edges_arg.as_str()],
        ));
        assert_eq!(n, 1);
        assert!(text.starts_with("{\"hour\":14,\"speed\":106.4"));
        assert!(text.ends_with("\"weekday\":\"Wed\"}\n"));
    }

    #[test]
    fn average_speed_requires_edges() {
        let (_dir, path) = corpus();
        let cli = cli(&path, &["--experiment", "average-speed"]);
        assert!(matches!(
            run(&cli, Vec::new()),
            Err(CliError::InvalidArgument(_))
        ));
    }
}
