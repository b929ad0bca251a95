//! A text renderer for modal stacks.

use core::time::Duration;

use parley_modal::{ContentRenderer, GuardOwner, ModalScope, ModalView, on_before_close};

use crate::dialog::Dialog;

/// How long an editor "asks the user" before answering a close request.
const CONFIRM_DELAY: Duration = Duration::from_millis(25);

/// One mounted dialog.
#[derive(Debug)]
pub struct Pane {
    title: String,
    detail: Option<String>,
    visible: bool,
    z_index: u32,
    _guards: Option<GuardOwner>,
}

impl Pane {
    /// Renders the pane as one line.
    #[must_use]
    pub fn line(&self) -> String {
        let mut line = format!("[z={}] {}", self.z_index, self.title);
        if let Some(detail) = &self.detail {
            line.push_str(" - ");
            line.push_str(detail);
        }
        if !self.visible {
            line.push_str(" (hidden)");
        }
        line
    }

    fn refresh(&mut self, view: &ModalView) {
        self.detail = view.props.get_as("detail");
        self.visible = view.visible;
        self.z_index = view.z_index;
    }
}

/// Mounts [`Dialog`] content as [`Pane`]s.
#[derive(Debug, Default)]
pub struct ConsoleRenderer {
    mounts: usize,
}

impl ConsoleRenderer {
    /// Number of mounts performed so far.
    #[must_use]
    pub fn mounts(&self) -> usize {
        self.mounts
    }
}

impl ContentRenderer for ConsoleRenderer {
    type Instance = Pane;

    fn mount(&mut self, view: &ModalView, _scope: &ModalScope) -> Pane {
        self.mounts += 1;
        let dialog = view.content.downcast_ref::<Dialog>();

        let guards = match dialog {
            Some(Dialog::Editor { document, title }) => {
                let document = document.clone();
                let title = title.clone();
                let registered = on_before_close(move || {
                    let unsaved = document.is_unsaved();
                    let title = title.clone();
                    async move {
                        tokio::time::sleep(CONFIRM_DELAY).await;
                        if unsaved {
                            tracing::info!(dialog = %title, "unsaved changes, keeping dialog open");
                        }
                        !unsaved
                    }
                });
                match registered {
                    Ok(owner) => Some(owner),
                    Err(error) => {
                        tracing::warn!(%error, "editor mounted without close protection");
                        None
                    }
                }
            }
            _ => None,
        };

        let mut pane = Pane {
            title: dialog.map_or_else(|| view.content.type_name().to_owned(), |d| d.title().to_owned()),
            detail: None,
            visible: true,
            z_index: 0,
            _guards: guards,
        };
        pane.refresh(view);
        pane
    }

    fn update(&mut self, pane: &mut Pane, view: &ModalView) {
        pane.refresh(view);
    }

    fn unmount(&mut self, pane: Pane) {
        tracing::debug!(dialog = %pane.title, "pane unmounted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::Document;
    use parley_modal::{ContentRef, ModalContext, ModalRenderer, Props};

    #[tokio::test]
    async fn editor_refuses_to_close_while_unsaved() {
        let context = ModalContext::default();
        let mut renderer = ModalRenderer::new(context.clone(), ConsoleRenderer::default());

        let document = Document::default();
        let editor = context.make_modal(ContentRef::new(Dialog::editor("Notes", document.clone())));
        editor.open(Props::new()).await;
        renderer.render();

        document.edit();
        assert!(!editor.close().await);

        document.save();
        assert!(editor.close().await);
        renderer.render();
        assert!(renderer.is_empty());
    }

    #[tokio::test]
    async fn pane_line_reflects_props_and_stacking() {
        let context = ModalContext::default();
        let mut renderer = ModalRenderer::new(context.clone(), ConsoleRenderer::default());

        let notice = context.make_modal(ContentRef::new(Dialog::notice("About")));
        notice.open(Props::new().with("detail", "v0.0.1")).await;
        renderer.render();

        let lines: Vec<String> = renderer.instances().map(|(_, pane)| pane.line()).collect();
        assert_eq!(lines, vec!["[z=1000] About - v0.0.1"]);
        assert_eq!(renderer.content_renderer().mounts(), 1);
    }
}
