use iced::widget::{Button, Column, Container, PickList, ProgressBar, Row, Text, TextInput};
use iced::{Alignment, Color, Element, Length, Task};
use rfd::AsyncFileDialog;
use std::path::PathBuf;
use uuid::Uuid;

use sumcheck::{
    parse_expected_digest, Algorithm, DigestResult, Error, HashJob, ProgressEvent, Result,
    Verifier, VerifierConfig, VerifyEvent, VerifySink,
};

#[derive(Debug, Clone)]
pub enum Message {
    FilePathChanged(String),
    ChooseFile,
    FileChosen(Option<PathBuf>),
    AlgorithmSelected(Algorithm),
    ExpectedChanged(String),
    LoadChecksumFile,
    ChecksumFileLoaded(Option<String>),
    Compute,
    Verification(Uuid, VerifyEvent),
}

/// The part of the window that verification events may update.
#[derive(Debug, Default)]
struct Outcome {
    progress: f32,
    result: Option<DigestResult>,
    error: Option<String>,
}

impl VerifySink for Outcome {
    fn progress(&mut self, event: ProgressEvent) {
        self.progress = event.percent as f32;
    }

    fn complete(&mut self, outcome: Result<DigestResult>) {
        match outcome {
            Ok(result) => {
                tracing::info!(digest = %result.hex_digest, matched = ?result.matched, "showing result");
                self.result = Some(result);
            }
            Err(e) => {
                tracing::warn!(error = %e, "showing error");
                self.progress = 0.0;
                self.error = Some(e.to_string());
            }
        }
    }
}

pub struct SumcheckApp {
    verifier: Verifier,
    file_path: String,
    algorithm: Algorithm,
    expected: String,
    outcome: Outcome,
    // job whose terminal event this window has not handled yet
    current_job: Option<Uuid>,
}

impl SumcheckApp {
    pub fn new() -> (Self, Task<Message>) {
        let config = VerifierConfig::default();
        (
            SumcheckApp {
                algorithm: config.default_algorithm,
                verifier: Verifier::new(config),
                file_path: String::new(),
                expected: String::new(),
                outcome: Outcome::default(),
                current_job: None,
            },
            Task::none(),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::FilePathChanged(s) => {
                self.file_path = s;
            }
            Message::ChooseFile => {
                return Task::perform(
                    async {
                        AsyncFileDialog::new()
                            .pick_file()
                            .await
                            .map(|h| h.path().to_path_buf())
                    },
                    Message::FileChosen,
                );
            }
            Message::FileChosen(Some(path)) => {
                self.file_path = path.display().to_string();
            }
            Message::FileChosen(None) => { /* cancelled */ }
            Message::AlgorithmSelected(a) => {
                self.algorithm = a;
            }
            Message::ExpectedChanged(s) => {
                self.expected = s;
            }
            Message::LoadChecksumFile => {
                return Task::perform(
                    async {
                        let handle = AsyncFileDialog::new()
                            .add_filter("checksums", &["txt", "sha256", "sha1", "md5", "sha512", "sum"])
                            .pick_file()
                            .await?;
                        Some(String::from_utf8_lossy(&handle.read().await).into_owned())
                    },
                    Message::ChecksumFileLoaded,
                );
            }
            Message::ChecksumFileLoaded(Some(text)) => {
                match parse_expected_digest(&text, self.algorithm) {
                    Some(digest) => self.expected = digest,
                    None => {
                        self.outcome.result = None;
                        self.outcome.error = Some("No checksum found in file.".to_string());
                    }
                }
            }
            Message::ChecksumFileLoaded(None) => {}
            Message::Compute => {
                if self.is_busy() {
                    self.outcome.error = Some(Error::Busy.to_string());
                    return Task::none();
                }
                let job = HashJob::new(self.file_path.trim(), self.algorithm)
                    .with_expected(&self.expected);
                match self.verifier.start(job) {
                    Ok(verification) => {
                        let id = verification.id();
                        tracing::debug!(job = %id, "compute requested");
                        self.outcome = Outcome::default();
                        self.current_job = Some(id);
                        return Task::run(verification.into_stream(), move |event| {
                            Message::Verification(id, event)
                        });
                    }
                    Err(e) => {
                        self.outcome.error = Some(e.to_string());
                    }
                }
            }
            Message::Verification(id, event) => {
                if self.current_job != Some(id) {
                    tracing::debug!(job = %id, "dropping event from a stale job");
                    return Task::none();
                }
                if event.is_terminal() {
                    self.current_job = None;
                }
                event.deliver(&mut self.outcome);
            }
        }
        Task::none()
    }

    pub fn view(&self) -> Element<'_, Message> {
        let busy = self.is_busy();

        let file_row = Row::new()
            .spacing(10)
            .push(Self::label("File:"))
            .push(
                TextInput::new("Path to file", &self.file_path)
                    .on_input(Message::FilePathChanged)
                    .padding(8)
                    .width(Length::Fill),
            )
            .push(
                Button::new(Text::new("Browse..."))
                    .on_press(Message::ChooseFile)
                    .padding(8),
            );

        let algo_row = Row::new()
            .spacing(10)
            .push(Self::label("Algorithm:"))
            .push(
                PickList::new(
                    Algorithm::ALL.to_vec(),
                    Some(self.algorithm),
                    Message::AlgorithmSelected,
                )
                .padding(8),
            );

        let expected_row = Row::new()
            .spacing(10)
            .push(Self::label("Expected Checksum:"))
            .push(
                TextInput::new("Optional", &self.expected)
                    .on_input(Message::ExpectedChanged)
                    .padding(8)
                    .width(Length::Fill),
            )
            .push(
                Button::new(Text::new("Load..."))
                    .on_press(Message::LoadChecksumFile)
                    .padding(8),
            );

        let compute_btn = Button::new(Text::new(if busy { "Computing..." } else { "Compute" }))
            .on_press_maybe((!busy).then_some(Message::Compute))
            .padding(10);

        let mut content = Column::new()
            .padding(15)
            .spacing(12)
            .width(Length::Fill)
            .push(file_row)
            .push(algo_row)
            .push(expected_row)
            .push(Column::new().width(Length::Fill).align_x(Alignment::Center).push(compute_btn));

        if let Some(result) = &self.outcome.result {
            let (line, color) = match result.matched {
                Some(true) => (
                    format!("{}  →  MATCH", result.hex_digest),
                    Color::from_rgb(0.1, 0.6, 0.1),
                ),
                Some(false) => (
                    format!("{}  →  MISMATCH", result.hex_digest),
                    Color::from_rgb(0.8, 0.1, 0.1),
                ),
                None => (result.hex_digest.clone(), Color::BLACK),
            };
            content = content.push(
                Text::new(line)
                    .size(14)
                    .style(move |_theme| iced::widget::text::Style { color: Some(color) }),
            );
        }

        if let Some(err) = &self.outcome.error {
            content = content.push(
                Text::new(format!("Error: {err}"))
                    .size(14)
                    .style(|_theme| iced::widget::text::Style {
                        color: Some(Color::from_rgb(0.8, 0.1, 0.1)),
                    }),
            );
        }

        content = content.push(ProgressBar::new(0.0..=100.0, self.outcome.progress));

        Container::new(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// The verifier frees itself as the last event leaves the worker stream;
    /// the window stays busy until it has handled that event.
    fn is_busy(&self) -> bool {
        self.verifier.is_busy() || self.current_job.is_some()
    }

    fn label(s: &'static str) -> Element<'static, Message> {
        Text::new(s).width(Length::Fixed(140.0)).into()
    }
}
