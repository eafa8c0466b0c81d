use serde::Serialize;

pub const DIALOG_TITLE: &str = "Submit a WIN";
pub const DIALOG_CALLBACK_ID: &str = "submit-win";
pub const DIALOG_SUBMIT_LABEL: &str = "Submit";

/// Body of the `dialog.open` call: the short-lived trigger plus the form
/// definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DialogOpenRequest {
    pub trigger_id: String,
    pub dialog: Dialog,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Dialog {
    pub title: String,
    pub callback_id: String,
    pub submit_label: String,
    pub elements: Vec<DialogElement>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogElementKind {
    Text,
    Textarea,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DialogElement {
    pub label: String,
    #[serde(rename = "type")]
    pub kind: DialogElementKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub optional: bool,
}

impl DialogElement {
    pub fn text(label: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: DialogElementKind::Text,
            name: name.into(),
            value: None,
            hint: None,
            optional: false,
        }
    }

    pub fn textarea(label: impl Into<String>, name: impl Into<String>) -> Self {
        Self { kind: DialogElementKind::Textarea, ..Self::text(label, name) }
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// The three-field WIN form. `who` is pre-filled with the raw command
/// text so `/wins Alice` lands with the subject already typed in.
pub fn submit_win_dialog(trigger_id: &str, prefill: &str) -> DialogOpenRequest {
    DialogOpenRequest {
        trigger_id: trigger_id.to_owned(),
        dialog: Dialog {
            title: DIALOG_TITLE.to_owned(),
            callback_id: DIALOG_CALLBACK_ID.to_owned(),
            submit_label: DIALOG_SUBMIT_LABEL.to_owned(),
            elements: vec![
                DialogElement::text("Who?", "who")
                    .value(prefill)
                    .hint("The name of the person who has this WIN"),
                DialogElement::text("Title", "title").hint("Title of this WIN"),
                DialogElement::textarea("Long description", "description")
                    .hint("Long description of this WIN (if any)")
                    .optional(),
            ],
        },
    }
}
