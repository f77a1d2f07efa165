use zone_core::constants::{
    ChatTarget, Modifiers, CHANT_MIN_CHAT_LINES, MSG_SN_CHANT_FIRST, MSG_SN_CHANT_SECOND_PREFIX,
    MSG_SN_CHANT_SECOND_SUFFIX, MSG_SN_CHANT_THIRD, SUPER_NOVICE_JOBS,
};

use crate::lifecycle::MapEngine;
use crate::network::client_commands::ClientRequest;

/// Chat counters kept across the session.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChatState {
    /// Public lines sent so far.
    pub chat_lines: u32,
    chant: ChantTracker,
}

/// Progress through the three Super Novice chant lines.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ChantTracker {
    stage: u8,
}

impl ChantTracker {
    /// Feeds one line. Returns true when this line follows a completed chant.
    fn advance(&mut self, text: &str, lines: &[String; 3]) -> bool {
        if text == lines[0] {
            self.stage = 1;
        } else if self.stage == 1 && text == lines[1] {
            self.stage = 2;
        } else if self.stage == 2 && text == lines[2] {
            self.stage = 3;
        } else if self.stage == 3 {
            self.stage = 0;
            return true;
        } else {
            self.stage = 0;
        }
        false
    }
}

/// Splits the channel prefix off `text` and applies the prefix and modifier toggles to
/// `target`.
fn route(text: &str, target: ChatTarget, modifiers: Modifiers) -> (&str, ChatTarget) {
    let toggle_party = text.starts_with('%') || modifiers.contains(Modifiers::CTRL);
    let toggle_guild = text.starts_with('$')
        || (modifiers.contains(Modifiers::ALT) && !modifiers.contains(Modifiers::DIGIT));

    let body = text
        .strip_prefix('%')
        .or_else(|| text.strip_prefix('$'))
        .unwrap_or(text);

    let mut target = target;
    if toggle_party {
        target.toggle(ChatTarget::PARTY);
    }
    if toggle_guild {
        target.toggle(ChatTarget::GUILD);
    }
    (body, target)
}

impl MapEngine {
    /// Sends a chat box line.
    ///
    /// A non-empty `user` makes it a whisper. Otherwise the line goes to party, guild or the
    /// public channel depending on `target`, a leading `%`/`$` and the held modifiers.
    pub fn request_talk(&mut self, user: &str, text: &str, target: ChatTarget) {
        let (body, target) = route(text, target, self.pointer.modifiers);

        if !user.is_empty() {
            self.link.send(&self.factory.build(&ClientRequest::Whisper {
                receiver: user.to_string(),
                message: body.to_string(),
            }));
            return;
        }

        let Some(entity) = self.session.entity.as_ref() else {
            log::warn!("Chat line dropped: not on a map");
            return;
        };
        let message = format!("{} : {}", entity.name, body);
        let job = entity.job;
        let name = entity.name.clone();

        let request = if target.contains(ChatTarget::PARTY) {
            ClientRequest::PartyChat { message }
        } else if target.contains(ChatTarget::GUILD) {
            ClientRequest::GuildChat { message }
        } else {
            self.chat.chat_lines += 1;
            ClientRequest::Chat { message }
        };
        self.link.send(&self.factory.build(&request));

        if self.chat.chat_lines > CHANT_MIN_CHAT_LINES
            && SUPER_NOVICE_JOBS.contains(&job)
            && self
                .session
                .character
                .base_exp_permille()
                .is_some_and(|p| p % 100 == 0)
        {
            let ui = &self.frontend.ui;
            let lines = [
                ui.message(MSG_SN_CHANT_FIRST),
                format!(
                    "{} {} {}",
                    ui.message(MSG_SN_CHANT_SECOND_PREFIX),
                    name,
                    ui.message(MSG_SN_CHANT_SECOND_SUFFIX)
                ),
                ui.message(MSG_SN_CHANT_THIRD),
            ];
            if self.chat.chant.advance(body, &lines) {
                log::info!("Super Novice chant completed");
                self.link.send(&self.factory.build(&ClientRequest::Chopokgi));
            }
        }
    }
}
