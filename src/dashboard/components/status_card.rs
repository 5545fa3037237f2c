//! Status card component for displaying status information

use egui::{Color32, RichText, Vec2};

use crate::dashboard::theme::{card_frame, ThemeColors};
use crate::scanner::Status;

/// A card displaying one labelled value
pub struct StatusCard {
    pub title: String,
    pub value: String,
    pub status: CardStatus,
}

/// Status types for cards
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardStatus {
    Active,
    Inactive,
    Busy,
    Error,
}

impl CardStatus {
    pub fn color(&self) -> Color32 {
        match self {
            CardStatus::Active => ThemeColors::SUCCESS,
            CardStatus::Inactive => ThemeColors::TEXT_SECONDARY,
            CardStatus::Busy => ThemeColors::WARNING,
            CardStatus::Error => ThemeColors::ERROR,
        }
    }
}

impl From<Status> for CardStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Idle => CardStatus::Inactive,
            Status::Processing => CardStatus::Busy,
            Status::Completed => CardStatus::Active,
            Status::Error => CardStatus::Error,
        }
    }
}

impl StatusCard {
    pub fn new(title: impl Into<String>, value: impl Into<String>, status: CardStatus) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            status,
        }
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        card_frame().show(ui, |ui| {
            ui.set_min_width(170.0);

            ui.horizontal(|ui| {
                let dot = ui.cursor().left_top() + Vec2::new(6.0, 10.0);
                ui.painter().circle_filled(dot, 4.0, self.status.color());
                ui.add_space(16.0);

                ui.vertical(|ui| {
                    ui.label(RichText::new(&self.title).size(12.0).color(ThemeColors::TEXT_MUTED));
                    ui.add_space(2.0);
                    ui.label(
                        RichText::new(&self.value)
                            .size(16.0)
                            .color(ThemeColors::TEXT_PRIMARY)
                            .strong(),
                    );
                });
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(CardStatus::from(Status::Idle), CardStatus::Inactive);
        assert_eq!(CardStatus::from(Status::Processing), CardStatus::Busy);
        assert_eq!(CardStatus::from(Status::Completed), CardStatus::Active);
        assert_eq!(CardStatus::from(Status::Error).color(), ThemeColors::ERROR);
    }
}
