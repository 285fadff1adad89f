pub mod rules;
pub mod session;
pub mod timer;

pub use self::rules::{
    apply_attack_result, apply_counter_result, apply_timeout, attacker_for_round, bonus_attacker,
};
pub use self::session::{
    Attempt, GameStatus, PendingAttack, Phase, Player, RoundRecord, RoundSession, TurnKey,
};
pub use self::timer::TurnTimer;
