//! Player requests raised by input and UI panels.

use crate::lifecycle::MapEngine;
use crate::network::client_commands::{ClientRequest, RestartKind};

impl MapEngine {
    fn send_request(&mut self, request: ClientRequest) {
        let cmd = self.factory.build(&request);
        self.link.send(&cmd);
    }

    /// Walk (or turn) towards the current pointer cell.
    pub fn request_move(&mut self, now: u64) {
        let pointer = self.pointer;
        let (mut ctx, movement) = self.movement_parts();
        movement.request_move(&mut ctx, pointer, now);
    }

    pub fn request_stop(&mut self) {
        self.movement.request_stop(&mut self.scheduler);
    }

    /// The local entity reached its destination.
    pub fn on_walk_end(&mut self, now: u64) {
        self.movement
            .on_walk_end(&self.session, &mut self.scheduler, now);
    }

    /// Queues `request` to be sent once the current walk ends (e.g. attack after approach).
    pub fn queue_move_action(&mut self, request: &ClientRequest) {
        let cmd = self.factory.build(request);
        self.session.set_pending_move_action(cmd);
    }

    pub fn cancel_move_action(&mut self) {
        self.session.clear_pending_move_action();
    }

    /// Asks to quit and leaves immediately without waiting for the answer.
    pub fn request_exit(&mut self) {
        self.send_request(ClientRequest::Quit);
        self.exit_teardown();
    }

    pub fn request_restart(&mut self) {
        self.send_request(ClientRequest::Restart(RestartKind::CharacterSelect));
    }

    pub fn request_return_to_save_point(&mut self) {
        self.send_request(ClientRequest::Restart(RestartKind::SavePoint));
    }

    pub fn request_resurrection(&mut self) {
        self.send_request(ClientRequest::Resurrection);
    }

    pub fn request_stat_update(&mut self, status_id: u16, amount: u8) {
        self.send_request(ClientRequest::StatusChange { status_id, amount });
    }

    pub fn drop_item(&mut self, index: u16, count: u16) {
        if count == 0 {
            return;
        }
        self.send_request(ClientRequest::ThrowItem { index, count });
    }

    pub fn use_item(&mut self, index: u16) {
        let account_id = match self.session.entity.as_ref() {
            Some(entity) => entity.gid,
            None => self.session.character.gid,
        };
        self.send_request(ClientRequest::UseItem { index, account_id });
    }

    pub fn equip_item(&mut self, index: u16, location: u32) {
        self.send_request(ClientRequest::WearEquip { index, location });
    }

    pub fn unequip_item(&mut self, index: u16) {
        self.send_request(ClientRequest::TakeoffEquip { index });
    }

    /// Equipment window options (e.g. show equipment to others).
    pub fn update_config(&mut self, kind: u32, value: u32) {
        self.send_request(ClientRequest::Config { kind, value });
    }

    /// Removes cart, mount or falcon.
    pub fn remove_cart_option(&mut self) {
        self.send_request(ClientRequest::CartOff);
    }
}

#[cfg(test)]
mod tests {
    use crate::network::client_commands::{ClientCommandType, ClientRequest};
    use crate::settings::Settings;
    use crate::test_support::{opcodes, Call, Harness, LEGACY_PACKETVER};

    #[test]
    fn item_requests_follow_packet_version() {
        let mut h = Harness::in_map();
        h.net.clear_sent();
        h.engine.use_item(5);
        h.engine.drop_item(5, 0);
        h.engine.drop_item(5, 2);

        let sent = h.net.sent();
        assert_eq!(
            opcodes(&sent),
            vec![
                ClientCommandType::UseItem2 as u16,
                ClientCommandType::ItemThrow2 as u16
            ]
        );
        assert_eq!(&sent[0][2..], &[5, 0, 0xF1, 0x49, 0x02, 0x00]);

        let settings = Settings {
            packet_version: LEGACY_PACKETVER,
            ..Settings::default()
        };
        let mut legacy = Harness::in_map_with(settings);
        legacy.net.clear_sent();
        legacy.engine.use_item(5);
        assert_eq!(
            opcodes(&legacy.net.sent()),
            vec![ClientCommandType::UseItem as u16]
        );
    }

    #[test]
    fn escape_menu_requests() {
        let mut h = Harness::in_map();
        h.net.clear_sent();
        h.engine.request_restart();
        h.engine.request_return_to_save_point();
        h.engine.request_resurrection();
        h.engine.request_stat_update(13, 1);
        h.engine.equip_item(3, 0x10);
        h.engine.unequip_item(3);
        h.engine.update_config(0, 1);
        h.engine.remove_cart_option();

        let sent = h.net.sent();
        assert_eq!(
            opcodes(&sent),
            vec![
                ClientCommandType::Restart as u16,
                ClientCommandType::Restart as u16,
                ClientCommandType::StandingResurrection as u16,
                ClientCommandType::StatusChange as u16,
                ClientCommandType::ReqWearEquip as u16,
                ClientCommandType::ReqTakeoffEquip as u16,
                ClientCommandType::Config as u16,
                ClientCommandType::ReqCartOff as u16,
            ]
        );
        assert_eq!(sent[0][2], 1);
        assert_eq!(sent[1][2], 0);
    }

    #[test]
    fn exit_request_sends_quit_then_tears_down() {
        let mut h = Harness::in_map();
        h.engine.request_move(1500);
        assert!(h.engine.has_walk_timer());
        h.net.clear_sent();
        h.journal.clear();
        h.engine.request_exit();

        assert_eq!(
            opcodes(&h.net.sent()),
            vec![ClientCommandType::RequestQuit as u16]
        );
        assert!(!h.net.is_open());
        assert!(!h.engine.has_walk_timer());
        assert!(!h.engine.has_ping_cycle());
        assert_eq!(h.journal.calls().last(), Some(&Call::RemoveBackground));

        // Nothing leaves once the transport is closed.
        h.engine.request_resurrection();
        assert_eq!(h.net.sent().len(), 1);

        h.engine.on_background_removed();
        assert_eq!(h.journal.calls().last(), Some(&Call::EnterPreGame));
    }

    #[test]
    fn queued_action_is_sent_after_walk_end() {
        let mut h = Harness::in_map();
        h.net.clear_sent();
        h.engine.queue_move_action(&ClientRequest::Act {
            target: 110000,
            action: 7,
        });
        h.engine.on_walk_end(3000);
        h.engine.update(3049);
        assert!(h.net.sent().is_empty());
        h.engine.update(3050);
        assert_eq!(
            opcodes(&h.net.sent()),
            vec![ClientCommandType::RequestAct2 as u16]
        );
        assert!(h.engine.session().pending_move_action().is_none());
    }
}
