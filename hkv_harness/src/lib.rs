//! Accessors generated at build time from `schema/game.yaml`.

pub mod game {
    include!(concat!(env!("OUT_DIR"), "/game.hkv.rs"));
}
