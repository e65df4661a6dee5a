// Idea session core: skill matching, enhancement, the feedback store and the
// actions exposed over HTTP. All generator calls go through `generator`.

pub mod enhancer;
pub mod export;
pub mod handlers;
pub mod service;
pub mod session;
pub mod skill_match;
pub mod store;
