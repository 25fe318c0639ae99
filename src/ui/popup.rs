use crate::prelude::HashMap;
use crate::traits::UiSurface;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PromptId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NotificationId(pub u64);

/// The modal shown when a location request comes from outside the boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryPrompt {
    pub id: PromptId,
    pub title: String,
    pub body: String,
    pub action_label: String,
}

impl BoundaryPrompt {
    pub fn new(id: PromptId) -> Self {
        Self {
            id,
            title: "Come to Heerlen".to_string(),
            body: "This feature is only available inside the blue circle on the map. \
                   Come to the centre of Heerlen to use the interactive map!"
                .to_string(),
            action_label: "I'm on my way!".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptPhase {
    Shown,
    /// Exit animation running, removal pending
    Dismissing,
}

/// Owns the boundary prompt and the transient notifications.
///
/// At most one prompt is on the page. Presenting a new one removes the old one
/// first, so prompts never stack.
#[derive(Debug, Default)]
pub struct PopupManager {
    prompt: Option<(PromptId, PromptPhase)>,
    notifications: HashMap<NotificationId, String>,
    next_id: u64,
}

impl PopupManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Shows a fresh prompt, replacing whatever prompt is on the page
    pub fn present_prompt(&mut self, ui: &mut dyn UiSurface) -> PromptId {
        if let Some((previous, _)) = self.prompt.take() {
            log::debug!("replacing boundary prompt {:?}", previous);
            ui.remove_prompt(previous);
        }

        let id = PromptId(self.next_id());
        ui.show_prompt(&BoundaryPrompt::new(id));
        self.prompt = Some((id, PromptPhase::Shown));
        id
    }

    /// Starts dismissing the shown prompt. Returns its id when one was shown.
    pub fn acknowledge_prompt(&mut self, ui: &mut dyn UiSurface) -> Option<PromptId> {
        match self.prompt {
            Some((id, PromptPhase::Shown)) => {
                ui.dismiss_prompt(id);
                self.prompt = Some((id, PromptPhase::Dismissing));
                Some(id)
            }
            _ => None,
        }
    }

    /// Removes a dismissed prompt after its exit animation settled.
    /// Ignored if the prompt was already replaced.
    pub fn remove_prompt(&mut self, id: PromptId, ui: &mut dyn UiSurface) {
        if matches!(self.prompt, Some((current, _)) if current == id) {
            self.prompt = None;
            ui.remove_prompt(id);
        }
    }

    pub fn active_prompt(&self) -> Option<PromptId> {
        self.prompt.map(|(id, _)| id)
    }

    pub fn prompt_phase(&self) -> Option<PromptPhase> {
        self.prompt.map(|(_, phase)| phase)
    }

    pub fn notify(&mut self, message: &str, ui: &mut dyn UiSurface) -> NotificationId {
        let id = NotificationId(self.next_id());
        ui.show_notification(id, message);
        self.notifications.insert(id, message.to_string());
        id
    }

    pub fn expire_notification(&mut self, id: NotificationId, ui: &mut dyn UiSurface) {
        if self.notifications.remove(&id).is_some() {
            ui.remove_notification(id);
        }
    }

    pub fn visible_notifications(&self) -> usize {
        self.notifications.len()
    }
}
