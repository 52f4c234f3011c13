use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::rc::Rc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use pretty_assertions::assert_eq;
use toybox::collab::QuotableClient;
use toybox::{
    Capability, CommandError, CommandRegistry, Context, DownloadError, DownloadOptions,
    ExitStatus, FetchError, MediaDownloader, Prompter, QuoteRecord, QuoteSource, RandomSource,
    cli, parse_integer,
};

/// Replays canned lines; counts how many prompts were issued.
struct ScriptedPrompter {
    lines: VecDeque<String>,
    prompts: usize,
}

impl ScriptedPrompter {
    fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            prompts: 0,
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn read_integer(&mut self, _label: &str) -> Result<i64, CommandError> {
        self.prompts += 1;
        let line = self.lines.pop_front().ok_or(CommandError::InputClosed)?;
        parse_integer(&line)
    }
}

/// Returns queued values in order, ignoring the requested bounds.
struct ScriptedRandom(VecDeque<i64>);

impl ScriptedRandom {
    fn new(values: &[i64]) -> Self {
        Self(values.iter().copied().collect())
    }
}

impl RandomSource for ScriptedRandom {
    fn between(&mut self, low: i64, _high: i64) -> i64 {
        self.0.pop_front().unwrap_or(low)
    }
}

enum FakeQuotes {
    Ok(QuoteRecord),
    Malformed,
}

impl QuoteSource for FakeQuotes {
    fn fetch(&self, _tag: Option<&str>) -> Result<QuoteRecord, FetchError> {
        match self {
            FakeQuotes::Ok(quote) => Ok(quote.clone()),
            FakeQuotes::Malformed => toybox::collab::quotable::parse_quote(r#"{"author":"Anon"}"#),
        }
    }
}

/// Remembers the tag filter of every fetch.
#[derive(Clone, Default)]
struct TagRecorder {
    tags: Rc<RefCell<Vec<Option<String>>>>,
}

impl QuoteSource for TagRecorder {
    fn fetch(&self, tag: Option<&str>) -> Result<QuoteRecord, FetchError> {
        self.tags.borrow_mut().push(tag.map(str::to_string));
        Ok(QuoteRecord {
            content: "Less is more.".into(),
            author: "Ludwig Mies van der Rohe".into(),
        })
    }
}

#[derive(Clone, Default)]
struct RecordingDownloader {
    calls: Rc<RefCell<Vec<(String, DownloadOptions)>>>,
}

impl MediaDownloader for RecordingDownloader {
    fn download(&self, url: &str, options: &DownloadOptions) -> Result<(), DownloadError> {
        self.calls
            .borrow_mut()
            .push((url.to_string(), options.clone()));
        Ok(())
    }
}

/// Fails to start, as when the executable vanished after startup.
struct BrokenDownloader;

impl MediaDownloader for BrokenDownloader {
    fn download(&self, _url: &str, _options: &DownloadOptions) -> Result<(), DownloadError> {
        Err(DownloadError::Launch {
            program: "yt-dlp".into(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        })
    }
}

/// Answer exactly one HTTP request with `response`; yields the request line.
fn serve_once(response: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/random", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        loop {
            let mut header = String::new();
            if reader.read_line(&mut header).unwrap() == 0 || header == "\r\n" {
                break;
            }
        }
        stream.write_all(response.as_bytes()).unwrap();
        request_line.trim_end().to_string()
    });
    (url, handle)
}

fn http_registry(url: &str) -> CommandRegistry {
    let client = QuotableClient::new(url, Duration::from_secs(5)).unwrap();
    registry_with(
        Capability::Available(client),
        Capability::<RecordingDownloader>::missing("yt-dlp", "disabled in tests"),
    )
}

struct Outcome {
    status: ExitStatus,
    out: String,
    err: String,
    prompts: usize,
}

fn registry_with<Q, D>(quotes: Capability<Q>, downloader: Capability<D>) -> CommandRegistry
where
    Q: QuoteSource + 'static,
    D: MediaDownloader + 'static,
{
    cli::registry(quotes, downloader).expect("commands register")
}

fn default_registry() -> CommandRegistry {
    registry_with(
        Capability::<FakeQuotes>::missing("HTTP client", "disabled in tests"),
        Capability::<RecordingDownloader>::missing("yt-dlp", "disabled in tests"),
    )
}

fn run(registry: &CommandRegistry, argv: &[&str], input: &[&str], random: &[i64]) -> Outcome {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let mut prompter = ScriptedPrompter::new(input);
    let mut random = ScriptedRandom::new(random);
    let mut full = vec!["toybox"];
    full.extend_from_slice(argv);
    let status = {
        let mut ctx = Context {
            out: &mut out,
            err: &mut err,
            prompter: &mut prompter,
            random: &mut random,
        };
        registry.dispatch(full, &mut ctx)
    };
    Outcome {
        status,
        out: String::from_utf8(out).unwrap(),
        err: String::from_utf8(err).unwrap(),
        prompts: prompter.prompts,
    }
}

#[test]
fn registers_the_four_commands() {
    assert_eq!(default_registry().names(), vec!["quote", "guess", "dice", "ytdl"]);
}

#[test]
fn guess_hints_then_wins() {
    let registry = default_registry();
    let res = run(
        &registry,
        &["guess", "--low", "1", "--high", "10", "--attempts", "3"],
        &["3", "9", "7"],
        &[7],
    );
    assert_eq!(res.status, ExitStatus::SUCCESS);
    assert_eq!(
        res.out,
        "Guess a number between 1 and 10. You have 3 attempts.\n\
         Try higher.\n\
         Try lower.\n\
         Correct! The number was 7.\n\
         Solved in 3 attempts.\n"
    );
}

#[test]
fn guess_loss_reveals_secret_and_exits_zero() {
    let registry = default_registry();
    let res = run(
        &registry,
        &["guess", "--low", "1", "--high", "10", "--attempts", "2"],
        &["1", "2"],
        &[5],
    );
    assert_eq!(res.status, ExitStatus::SUCCESS);
    assert!(res.out.ends_with("Out of attempts! The number was 5.\n"));
    assert_eq!(res.prompts, 2);
}

#[test]
fn guess_malformed_input_does_not_consume_attempts() {
    let registry = default_registry();
    let res = run(
        &registry,
        &["guess", "--low", "1", "--high", "10", "--attempts", "1"],
        &["abc", "", "4.5", "6"],
        &[6],
    );
    assert_eq!(res.status, ExitStatus::SUCCESS);
    assert_eq!(res.out.matches("Please enter an integer.").count(), 3);
    assert!(res.out.contains("Correct! The number was 6."));
    assert!(res.out.contains("Solved in 1 attempt."));
    assert_eq!(res.prompts, 4);
}

#[test]
fn guess_equal_bounds_fail_without_prompting() {
    let registry = default_registry();
    let res = run(&registry, &["guess", "--low", "5", "--high", "5"], &["5"], &[5]);
    assert_eq!(res.status, ExitStatus::FAILURE);
    assert_eq!(res.prompts, 0);
    assert_eq!(res.out, "");
    assert!(res.err.contains("low must be < high"));
}

#[test]
fn guess_closed_input_is_an_error() {
    let registry = default_registry();
    let res = run(&registry, &["guess"], &["50"], &[10]);
    assert_eq!(res.status, ExitStatus::FAILURE);
    assert!(res.err.contains("input closed"));
}

#[test]
fn guess_negative_attempts_rejected() {
    let registry = default_registry();
    let res = run(&registry, &["guess", "--attempts", "-1"], &[], &[]);
    assert_eq!(res.status, ExitStatus::FAILURE);
    assert_eq!(res.prompts, 0);
}

#[test]
fn dice_single_roll_has_no_average() {
    let registry = default_registry();
    let res = run(
        &registry,
        &["dice", "--count", "2", "--sides", "6", "--rolls", "1"],
        &[],
        &[3, 5],
    );
    assert_eq!(res.status, ExitStatus::SUCCESS);
    assert_eq!(res.out, "Roll: [3, 5] -> total 8\n");
}

#[test]
fn dice_multiple_rolls_print_average() {
    let registry = default_registry();
    let res = run(
        &registry,
        &["dice", "--count", "1", "--rolls", "3"],
        &[],
        &[2, 4, 6],
    );
    assert_eq!(res.status, ExitStatus::SUCCESS);
    assert_eq!(
        res.out,
        "Roll: [2] -> total 2\n\
         Roll: [4] -> total 4\n\
         Roll: [6] -> total 6\n\
         Average total over 3 rolls: 4.00\n"
    );
}

#[test]
fn dice_zero_count_is_rejected() {
    let registry = default_registry();
    let res = run(&registry, &["dice", "--count", "0"], &[], &[1]);
    assert_eq!(res.status, ExitStatus::FAILURE);
    assert_eq!(res.out, "");
    assert!(res.err.contains("count>=1"));
}

#[test]
fn non_integer_option_fails_validation() {
    let registry = default_registry();
    let res = run(&registry, &["dice", "--sides", "six"], &[], &[]);
    assert_eq!(res.status, ExitStatus::FAILURE);
    assert!(res.err.contains("invalid value 'six' for '--sides'"));
}

#[test]
fn unknown_command_exits_two() {
    let registry = default_registry();
    let res = run(&registry, &["roll"], &[], &[]);
    assert_eq!(res.status, ExitStatus::USAGE);
    assert!(res.err.contains("quote, guess, dice, ytdl"));
}

#[test]
fn quote_prints_content_and_author() {
    let registry = registry_with(
        Capability::Available(FakeQuotes::Ok(QuoteRecord {
            content: "Simplicity is prerequisite for reliability.".into(),
            author: "Edsger Dijkstra".into(),
        })),
        Capability::<RecordingDownloader>::missing("yt-dlp", "disabled in tests"),
    );
    let res = run(&registry, &["quote", "--tag", "technology"], &[], &[]);
    assert_eq!(res.status, ExitStatus::SUCCESS);
    assert_eq!(
        res.out,
        "\n\"Simplicity is prerequisite for reliability.\" — Edsger Dijkstra\n\n"
    );
}

#[test]
fn quote_malformed_payload_fails_with_one_line() {
    let registry = registry_with(
        Capability::Available(FakeQuotes::Malformed),
        Capability::<RecordingDownloader>::missing("yt-dlp", "disabled in tests"),
    );
    let res = run(&registry, &["quote"], &[], &[]);
    assert_eq!(res.status, ExitStatus::FAILURE);
    assert_eq!(res.out, "");
    assert_eq!(res.err.lines().count(), 1);
    assert!(res.err.starts_with("error: failed to fetch quote: malformed quote payload"));
}

#[test]
fn quote_without_client_reports_missing_dependency() {
    let registry = default_registry();
    let res = run(&registry, &["quote"], &[], &[]);
    assert_eq!(res.status, ExitStatus::FAILURE);
    assert_eq!(res.err, "error: HTTP client is not available: disabled in tests\n");
}

#[test]
fn ytdl_without_downloader_reports_missing_dependency() {
    let registry = default_registry();
    let res = run(&registry, &["ytdl", "https://example.com/v"], &[], &[]);
    assert_eq!(res.status, ExitStatus::FAILURE);
    assert!(res.err.contains("yt-dlp is not available"));
}

#[test]
fn ytdl_requires_url() {
    let downloader = RecordingDownloader::default();
    let registry = registry_with(
        Capability::<FakeQuotes>::missing("HTTP client", "disabled in tests"),
        Capability::Available(downloader.clone()),
    );
    let res = run(&registry, &["ytdl", "--audio-only"], &[], &[]);
    assert_eq!(res.status, ExitStatus::FAILURE);
    assert!(downloader.calls.borrow().is_empty());
}

#[test]
fn ytdl_creates_directory_idempotently_and_downloads() {
    let tmp = tempfile::tempdir().unwrap();
    let target: PathBuf = tmp.path().join("media").join("music");
    let target_arg = target.to_str().unwrap().to_string();
    let downloader = RecordingDownloader::default();
    let registry = registry_with(
        Capability::<FakeQuotes>::missing("HTTP client", "disabled in tests"),
        Capability::Available(downloader.clone()),
    );

    for _ in 0..2 {
        let res = run(
            &registry,
            &["ytdl", "https://example.com/v", "--audio-only", "--out", &target_arg],
            &[],
            &[],
        );
        assert_eq!(res.status, ExitStatus::SUCCESS, "stderr: {}", res.err);
    }
    assert!(target.is_dir());

    let calls = downloader.calls.borrow();
    assert_eq!(calls.len(), 2);
    let (url, options) = &calls[0];
    assert_eq!(url, "https://example.com/v");
    assert_eq!(options, &DownloadOptions::for_directory(&target, true));
}

#[test]
fn quote_empty_tag_means_no_filter() {
    let quotes = TagRecorder::default();
    let registry = registry_with(
        Capability::Available(quotes.clone()),
        Capability::<RecordingDownloader>::missing("yt-dlp", "disabled in tests"),
    );
    assert_eq!(run(&registry, &["quote", "--tag", ""], &[], &[]).status, ExitStatus::SUCCESS);
    assert_eq!(run(&registry, &["quote", "--tag", "wisdom"], &[], &[]).status, ExitStatus::SUCCESS);
    assert_eq!(*quotes.tags.borrow(), vec![None, Some("wisdom".to_string())]);
}

#[test]
fn quote_over_http_sends_tag_and_prints() {
    let (url, server) = serve_once(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 39\r\nConnection: close\r\n\r\n{\"content\":\"Be brief.\",\"author\":\"Anon\"}",
    );
    let res = run(&http_registry(&url), &["quote", "--tag", "life"], &[], &[]);
    assert_eq!(res.status, ExitStatus::SUCCESS, "stderr: {}", res.err);
    assert_eq!(res.out, "\n\"Be brief.\" — Anon\n\n");
    assert_eq!(server.join().unwrap(), "GET /random?tags=life HTTP/1.1");
}

#[test]
fn quote_http_error_status_fails_with_one_line() {
    let (url, server) = serve_once(
        "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
    );
    let res = run(&http_registry(&url), &["quote"], &[], &[]);
    server.join().unwrap();
    assert_eq!(res.status, ExitStatus::FAILURE);
    assert_eq!(res.out, "");
    assert_eq!(res.err.lines().count(), 1);
    assert!(res.err.starts_with("error: failed to fetch quote: request failed"));
    assert!(res.err.contains("503"));
}

#[test]
fn quote_unreachable_server_fails_with_one_line() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/random", listener.local_addr().unwrap());
    drop(listener);
    let res = run(&http_registry(&url), &["quote"], &[], &[]);
    assert_eq!(res.status, ExitStatus::FAILURE);
    assert_eq!(res.err.lines().count(), 1);
    assert!(res.err.starts_with("error: failed to fetch quote: request failed"));
}

#[test]
fn ytdl_download_failure_reports_one_line_and_keeps_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let target = tmp.path().join("downloads");
    let registry = registry_with(
        Capability::<FakeQuotes>::missing("HTTP client", "disabled in tests"),
        Capability::Available(BrokenDownloader),
    );
    let res = run(
        &registry,
        &["ytdl", "https://example.com/v", "--out", target.to_str().unwrap()],
        &[],
        &[],
    );
    assert_eq!(res.status, ExitStatus::FAILURE);
    assert_eq!(res.out, "");
    assert_eq!(res.err.lines().count(), 1);
    assert!(res.err.starts_with("error: download failed: failed to launch yt-dlp"));
    assert!(target.is_dir());
}
