use numble_core::rules;
use numble_types::Room;

pub const HOST: &str = "client-host";
pub const GUEST: &str = "client-guest";

/// Room with both seats taken, still in setup.
pub fn create_joined_room() -> Room {
    let mut room = rules::create_room("AB12CD".to_string(), HOST);
    rules::join(&mut room, GUEST).unwrap();
    room
}

/// Room where both players have submitted their setup.
pub fn create_ready_room(host_secret: &str, guest_secret: &str) -> Room {
    let mut room = create_joined_room();
    rules::set_player_setup(&mut room, HOST, "Alice", host_secret).unwrap();
    rules::set_player_setup(&mut room, GUEST, "Bob", guest_secret).unwrap();
    room
}

/// Room mid-round with the given secrets.
pub fn create_playing_room(host_secret: &str, guest_secret: &str) -> Room {
    let mut room = create_ready_room(host_secret, guest_secret);
    rules::start(&mut room, HOST).unwrap();
    room
}
