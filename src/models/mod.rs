pub mod answer_record;
pub mod category;
pub mod question;
pub mod tag;
pub mod test_definition;
pub mod test_session;
pub mod user;
pub mod video_clip;
pub mod view_consumption;
