use serenity::{
    all::ButtonStyle,
    builder::{CreateActionRow, CreateButton},
};

use crate::audio::catalog::COUNTDOWN_OPTIONS;

/// Custom ids carried by the menu buttons
pub mod button_ids {
    pub const COUNT_PREFIX: &str = "count";
    pub const STOP: &str = "stop";
    pub const LEAVE: &str = "leave";
}

/// Discord rejects action rows with more than five buttons.
pub const MAX_BUTTONS_PER_ROW: usize = 5;

pub const MENU_PROMPT: &str = "🔊 Choose a countdown option:";
pub const FINISHED_PROMPT: &str = "✅ Countdown finished! What do you want to do next?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuStyle {
    Primary,
    Secondary,
    Danger,
}

impl From<MenuStyle> for ButtonStyle {
    fn from(style: MenuStyle) -> Self {
        match style {
            MenuStyle::Primary => ButtonStyle::Primary,
            MenuStyle::Secondary => ButtonStyle::Secondary,
            MenuStyle::Danger => ButtonStyle::Danger,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuButton {
    pub custom_id: String,
    pub label: &'static str,
    pub style: MenuStyle,
}

pub fn count_id(duration: u32) -> String {
    format!("{}{}", button_ids::COUNT_PREFIX, duration)
}

/// Rows of countdown buttons, then one row with stop and leave.
pub fn menu_layout() -> Vec<Vec<MenuButton>> {
    let mut rows: Vec<Vec<MenuButton>> = COUNTDOWN_OPTIONS
        .chunks(MAX_BUTTONS_PER_ROW)
        .map(|chunk| {
            chunk
                .iter()
                .map(|option| MenuButton {
                    custom_id: count_id(option.duration),
                    label: option.label,
                    style: MenuStyle::Primary,
                })
                .collect()
        })
        .collect();

    rows.push(vec![
        MenuButton {
            custom_id: button_ids::STOP.to_string(),
            label: "⏹ Stop",
            style: MenuStyle::Danger,
        },
        MenuButton {
            custom_id: button_ids::LEAVE.to_string(),
            label: "👋 Leave",
            style: MenuStyle::Secondary,
        },
    ]);

    rows
}

pub fn create_menu_rows() -> Vec<CreateActionRow> {
    menu_layout()
        .into_iter()
        .map(|row| {
            CreateActionRow::Buttons(
                row.into_iter()
                    .map(|button| {
                        CreateButton::new(button.custom_id)
                            .label(button.label)
                            .style(button.style.into())
                    })
                    .collect(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(row: &[MenuButton]) -> Vec<&str> {
        row.iter().map(|b| b.custom_id.as_str()).collect()
    }

    #[test]
    fn test_layout_groups_countdowns_by_five() {
        let layout = menu_layout();

        assert_eq!(layout.len(), 3);
        assert_eq!(
            ids(&layout[0]),
            vec!["count5", "count10", "count15", "count20", "count25"]
        );
        assert_eq!(ids(&layout[1]), vec!["count30"]);
        assert_eq!(ids(&layout[2]), vec!["stop", "leave"]);
    }

    #[test]
    fn test_no_row_exceeds_limit() {
        assert!(menu_layout()
            .iter()
            .all(|row| !row.is_empty() && row.len() <= MAX_BUTTONS_PER_ROW));
    }

    #[test]
    fn test_control_styles() {
        let layout = menu_layout();
        let controls = layout.last().unwrap();

        assert_eq!(controls[0].style, MenuStyle::Danger);
        assert_eq!(controls[1].style, MenuStyle::Secondary);
        assert!(layout[..layout.len() - 1]
            .iter()
            .flatten()
            .all(|b| b.style == MenuStyle::Primary));
    }

    #[test]
    fn test_layout_is_deterministic() {
        assert_eq!(menu_layout(), menu_layout());
        assert_eq!(create_menu_rows().len(), menu_layout().len());
    }
}
