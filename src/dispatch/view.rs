//! Observable presentation state for the dispatcher.
//!
//! Each analysis type owns one loading indicator. Callers subscribe to an
//! indicator to learn when a request for that type is in flight, and use the
//! `render_*` helpers to turn a successful result into display text. Nothing
//! here issues requests; [`Session`] ties the two halves together.

use std::fmt::Display;

use owo_colors::OwoColorize;
use tokio::sync::watch;

use crate::dispatch::client::{Dispatcher, check_media, check_text};
use crate::dispatch::endpoint::Endpoint;
use crate::dispatch::error::DispatchError;
use crate::dispatch::media::{MediaFile, MediaKind};
use crate::dispatch::payload::TextAnalysis;

/// Loading state of one analysis type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    InFlight,
}

/// Single-slot loading indicator.
///
/// Overlapping submissions of the same type share the slot; whichever
/// finishes last decides the final state.
#[derive(Debug)]
pub struct Indicator {
    state: watch::Sender<Phase>,
}

impl Default for Indicator {
    fn default() -> Self {
        let (state, _) = watch::channel(Phase::Idle);
        Self { state }
    }
}

impl Indicator {
    pub fn phase(&self) -> Phase {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.state.subscribe()
    }

    /// Marks the indicator in flight until the returned guard is dropped.
    pub fn begin(&self) -> InFlight<'_> {
        self.state.send_replace(Phase::InFlight);
        InFlight { indicator: self }
    }
}

/// Returns its indicator to idle when dropped, on success and failure alike.
#[must_use = "the indicator goes idle as soon as the guard is dropped"]
pub struct InFlight<'a> {
    indicator: &'a Indicator,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.indicator.state.send_replace(Phase::Idle);
    }
}

#[derive(Debug, Default)]
pub struct ViewModel {
    text: Indicator,
    image: Indicator,
    video: Indicator,
}

impl ViewModel {
    pub fn indicator(&self, endpoint: Endpoint) -> &Indicator {
        match endpoint {
            Endpoint::Sentiment => &self.text,
            Endpoint::AnalyzeImage => &self.image,
            Endpoint::AnalyzeVideo => &self.video,
        }
    }
}

/// A dispatcher paired with the view model it reports progress to.
#[derive(Debug, Default)]
pub struct Session {
    dispatcher: Dispatcher,
    view: ViewModel,
}

impl Session {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            view: ViewModel::default(),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn view(&self) -> &ViewModel {
        &self.view
    }

    /// Raises the text indicator only for input that will actually be sent.
    pub async fn analyze_text(&self, text: &str) -> Result<TextAnalysis, DispatchError> {
        check_text(text)?;
        let _busy = self.view.indicator(Endpoint::Sentiment).begin();
        self.dispatcher.submit_text(text).await
    }

    pub async fn analyze_image(&self, file: Option<&MediaFile>) -> Result<String, DispatchError> {
        let file = check_media(MediaKind::Image, file)?;
        let _busy = self.view.indicator(Endpoint::AnalyzeImage).begin();
        self.dispatcher.submit_image(Some(file)).await
    }

    pub async fn analyze_video(&self, file: Option<&MediaFile>) -> Result<String, DispatchError> {
        let file = check_media(MediaKind::Video, file)?;
        let _busy = self.view.indicator(Endpoint::AnalyzeVideo).begin();
        self.dispatcher.submit_video(Some(file)).await
    }
}

fn label(name: &str, styled: bool) -> String {
    if styled {
        name.bold().to_string()
    } else {
        name.to_string()
    }
}

fn line(name: &str, value: impl Display, styled: bool) -> String {
    format!("{} {value}", label(name, styled))
}

pub fn render_text(analysis: &TextAnalysis, styled: bool) -> String {
    let scores = &analysis.sentiment;
    let language = analysis.language.as_deref().unwrap_or("unknown");
    let translated = analysis.translated_text.as_deref().unwrap_or("unavailable");

    [
        line("Detected language:", language, styled),
        line("Translated text:", translated, styled),
        [
            line("Compound:", scores.compound, styled),
            line("Negative:", scores.neg, styled),
            line("Neutral:", scores.neu, styled),
            line("Positive:", scores.pos, styled),
        ]
        .join(", "),
    ]
    .join("\n")
}

pub fn render_expression(expression: &str, styled: bool) -> String {
    line("Expression:", expression, styled)
}

pub fn render_video(analysis: &str, styled: bool) -> String {
    line("Analysis:", analysis, styled)
}
