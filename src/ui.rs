use std::path::PathBuf;
use std::time::Duration;

use iced::widget::{button, column, container, image, row, scrollable, text, Row, Space};
use iced::{Element, Font, Length, Subscription, Task, Theme};
use tracing::warn;

use crate::llm::{self, media, GenerateError};
use crate::prompt::VideoPrompt;
use crate::session::{ImageAsset, Phase, SessionContext};

/// Multi-file drops arrive as one event per file; drops within this window
/// are applied together as a single replacing selection.
const DROP_SETTLE: Duration = Duration::from_millis(150);

const COPY_FEEDBACK: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub enum Message {
    OpenFilePicker,
    FilesPicked(Vec<PathBuf>),
    FileDropped(PathBuf),
    DropSettled,
    ClearImages,
    Generate,
    Generated(Result<VideoPrompt, GenerateError>),
    CopyPrompt,
    CopyFeedbackExpired,
}

#[derive(Default)]
pub struct App {
    session: SessionContext,
    pending_drop: Vec<PathBuf>,
    copied: bool,
}

async fn pick_images() -> Vec<PathBuf> {
    rfd::AsyncFileDialog::new()
        .set_title("Select images")
        .add_filter("Images", &media::IMAGE_EXTENSIONS)
        .pick_files()
        .await
        .map(|files| {
            files
                .iter()
                .map(|file| file.path().to_path_buf())
                .collect()
        })
        .unwrap_or_default()
}

/// Fan-out encode of the selected files, then one schema-constrained Gemini
/// call. Any failure along the way fails the whole attempt.
async fn run_generation(paths: Vec<PathBuf>) -> Result<VideoPrompt, GenerateError> {
    let payloads = media::encode_image_files(paths).await?;
    llm::generate_video_prompt(payloads).await
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        (Self::default(), Task::none())
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    pub fn subscription(&self) -> Subscription<Message> {
        iced::event::listen_with(|event, _status, _window| match event {
            iced::Event::Window(iced::window::Event::FileDropped(path)) => {
                Some(Message::FileDropped(path))
            }
            _ => None,
        })
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenFilePicker => {
                if self.session.is_generating() {
                    return Task::none();
                }
                Task::perform(pick_images(), Message::FilesPicked)
            }
            Message::FilesPicked(paths) => {
                self.replace_images(paths);
                Task::none()
            }
            Message::FileDropped(path) => {
                if self.session.is_generating() {
                    return Task::none();
                }
                if !media::has_image_extension(&path) {
                    warn!("Ignoring dropped non-image file {}", path.display());
                    return Task::none();
                }
                self.pending_drop.push(path);
                if self.pending_drop.len() == 1 {
                    return Task::perform(tokio::time::sleep(DROP_SETTLE), |_| {
                        Message::DropSettled
                    });
                }
                Task::none()
            }
            Message::DropSettled => {
                let paths = std::mem::take(&mut self.pending_drop);
                self.replace_images(paths);
                Task::none()
            }
            Message::ClearImages => {
                if !self.session.is_generating() {
                    self.session.clear();
                    self.copied = false;
                }
                Task::none()
            }
            Message::Generate => {
                if !self.session.begin_generation() {
                    return Task::none();
                }
                self.copied = false;
                let paths: Vec<PathBuf> = self
                    .session
                    .images()
                    .iter()
                    .map(|asset| asset.path.clone())
                    .collect();
                Task::perform(run_generation(paths), Message::Generated)
            }
            Message::Generated(result) => {
                self.session.finish(result);
                Task::none()
            }
            Message::CopyPrompt => {
                let Phase::Succeeded { pretty, .. } = self.session.phase() else {
                    return Task::none();
                };
                let contents = pretty.clone();
                self.copied = true;
                Task::batch([
                    iced::clipboard::write(contents),
                    Task::perform(tokio::time::sleep(COPY_FEEDBACK), |_| {
                        Message::CopyFeedbackExpired
                    }),
                ])
            }
            Message::CopyFeedbackExpired => {
                self.copied = false;
                Task::none()
            }
        }
    }

    fn replace_images(&mut self, paths: Vec<PathBuf>) {
        if paths.is_empty() {
            return;
        }
        let assets: Vec<ImageAsset> = paths.into_iter().map(ImageAsset::from_path).collect();
        self.session.set_images(assets);
        self.copied = false;
    }

    pub fn view(&self) -> Element<'_, Message> {
        let header = column![
            text("Visual-to-Video Prompt Generator").size(28),
            text("Transform any image into a detailed, cinematic video prompt.").size(14),
        ]
        .spacing(6);

        let can_interact = !self.session.is_generating();
        let has_images = !self.session.images().is_empty();

        let drop_zone: Element<'_, Message> = if has_images {
            let thumbnails = self
                .session
                .images()
                .iter()
                .fold(Row::new().spacing(8), |thumbs, asset| {
                    thumbs.push(
                        image(asset.preview.clone())
                            .width(Length::Fixed(96.0))
                            .height(Length::Fixed(96.0)),
                    )
                });
            container(scrollable(thumbnails))
                .padding(12)
                .width(Length::Fill)
                .into()
        } else {
            container(
                column![
                    text("Drop images here").size(18),
                    text("PNG, JPEG or WEBP"),
                ]
                .spacing(4),
            )
            .padding(24)
            .width(Length::Fill)
            .center_x(Length::Fill)
            .into()
        };

        let controls = row![
            button("Select Images...")
                .on_press_maybe(can_interact.then_some(Message::OpenFilePicker)),
            button(text(if self.session.is_generating() {
                "Generating..."
            } else {
                "Generate Prompt"
            }))
            .on_press_maybe((can_interact && has_images).then_some(Message::Generate)),
            button("Clear Images")
                .on_press_maybe((can_interact && has_images).then_some(Message::ClearImages)),
        ]
        .spacing(10);

        let result_pane: Element<'_, Message> = match self.session.phase() {
            Phase::Idle => column![
                text("Your generated prompt will appear here."),
                text("Upload one or more images and click \"Generate Prompt\" to start.")
                    .size(13),
            ]
            .spacing(6)
            .into(),
            Phase::Generating => text("Generating video prompt...").size(16).into(),
            Phase::Failed(message) => text(format!("Error: {message}")).into(),
            Phase::Succeeded { pretty, .. } => {
                let copy_label = if self.copied { "Copied!" } else { "Copy" };
                column![
                    row![
                        text("Generated Video Prompt").size(16),
                        Space::with_width(Length::Fill),
                        button(copy_label).on_press(Message::CopyPrompt),
                    ]
                    .spacing(10),
                    scrollable(text(pretty.as_str()).font(Font::MONOSPACE).size(13))
                        .height(Length::Fill),
                ]
                .spacing(10)
                .into()
            }
        };

        let content = column![
            header,
            drop_zone,
            controls,
            container(result_pane)
                .padding(16)
                .width(Length::Fill)
                .height(Length::Fill),
        ]
        .spacing(16)
        .padding(20);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}
