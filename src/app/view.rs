// SPDX-License-Identifier: GPL-3.0-only

//! Main application view
//!
//! One column: the captured image, the capture button, the result text.

use crate::app::state::{AppModel, Message};
use crate::constants::ui;
use crate::fl;
use cosmic::Element;
use cosmic::iced::{Alignment, Length};
use cosmic::widget;

impl AppModel {
    pub fn view(&self) -> Element<'_, Message> {
        let spacing = cosmic::theme::spacing();

        let result_text: Element<'_, Message> = match self.session.text() {
            Some(text) => widget::text(text).size(ui::RESULT_TEXT_SIZE).into(),
            None => widget::Space::new(Length::Shrink, Length::Fixed(f32::from(ui::RESULT_TEXT_SIZE)))
                .into(),
        };

        widget::column()
            .push(self.build_image_area())
            .push(widget::vertical_space().height(spacing.space_m))
            .push(
                widget::button::suggested(fl!("capture"))
                    .leading_icon(widget::icon::from_name("camera-photo-symbolic"))
                    .on_press(Message::Capture),
            )
            .push(widget::vertical_space().height(spacing.space_m))
            .push(result_text)
            .align_x(Alignment::Center)
            .width(Length::Fill)
            .padding(spacing.space_l)
            .into()
    }

    /// Square area showing the last captured image, empty until the first capture
    fn build_image_area(&self) -> Element<'_, Message> {
        let content: Element<'_, Message> = match &self.preview {
            Some(handle) => widget::image(handle.clone())
                .content_fit(cosmic::iced::ContentFit::Contain)
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => widget::icon::from_name("image-x-generic-symbolic")
                .size(64)
                .icon()
                .into(),
        };

        widget::container(content)
            .width(Length::Fixed(ui::IMAGE_AREA_SIZE))
            .height(Length::Fixed(ui::IMAGE_AREA_SIZE))
            .center_x(ui::IMAGE_AREA_SIZE)
            .center_y(ui::IMAGE_AREA_SIZE)
            .class(cosmic::theme::Container::Card)
            .into()
    }
}
