pub mod challenges;
pub mod content;
pub mod enrollments;
pub mod health;
pub mod users;

pub use challenges::{
    create_challenge, created_challenges, delete_challenge, get_challenge, list_challenges,
    recent_challenges, update_challenge,
};
pub use content::{all_events, all_tips, recent_tips, upcoming_events};
pub use enrollments::{
    delete_user_challenge, join_challenge, list_user_challenges, update_user_challenge,
};
pub use health::{health_check, metrics_endpoint, readiness_check, root};
pub use users::create_user;
