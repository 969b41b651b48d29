// SPDX-License-Identifier: GPL-3.0-only

//! Image labeling handlers

use crate::app::state::{AppModel, Message};
use crate::backends::classifier::{ClassifyResult, Classifier, load_classifier};
use crate::session::{CycleTicket, QueuedImage};
use cosmic::Task;
use std::sync::Arc;
use tracing::{debug, info};

impl AppModel {
    /// Load the configured labeler off the UI thread
    ///
    /// Starts a new load generation; answers to earlier loads are discarded.
    pub(crate) fn reload_classifier(&mut self) -> Task<cosmic::Action<Message>> {
        let generation = self.labeler.begin_load();
        let config = self.config.clone();
        debug!(generation, "Loading labeler");
        Task::perform(
            async move { load_classifier(&config).await },
            move |classifier| {
                cosmic::Action::App(Message::ClassifierLoaded(generation, classifier))
            },
        )
    }

    /// Hand an image to the labeler, or hold it until the labeler is loaded
    pub(crate) fn dispatch_classification(
        &mut self,
        queued: QueuedImage,
    ) -> Task<cosmic::Action<Message>> {
        match self.labeler.submit(queued) {
            Some((classifier, item)) => classify_task(classifier.as_ref(), item),
            None => Task::none(),
        }
    }

    pub(crate) fn handle_classifier_loaded(
        &mut self,
        generation: u64,
        classifier: Arc<dyn Classifier>,
    ) -> Task<cosmic::Action<Message>> {
        let Some((classifier, ready)) = self.labeler.finish_load(generation, classifier) else {
            return Task::none();
        };
        info!(?classifier, generation, waiting = ready.len(), "Labeler ready");

        let tasks: Vec<_> = ready
            .into_iter()
            .map(|item| classify_task(classifier.as_ref(), item))
            .collect();
        Task::batch(tasks)
    }

    pub(crate) fn handle_classified(
        &mut self,
        ticket: CycleTicket,
        result: ClassifyResult,
    ) -> Task<cosmic::Action<Message>> {
        if !self.session.on_labels(ticket, result) {
            debug!(cycle = ticket.cycle, "Labels arrived after close");
        }
        Task::none()
    }
}

fn classify_task(classifier: &dyn Classifier, item: QueuedImage) -> Task<cosmic::Action<Message>> {
    let QueuedImage {
        ticket,
        image,
        rotation,
    } = item;
    let labeling = classifier.classify(image, rotation);
    Task::perform(labeling, move |result| {
        cosmic::Action::App(Message::Classified(ticket, result))
    })
}
