pub mod list;
pub mod playback;
pub mod timer;

pub use list::{ListPhase, ListRequest, ListResponse, PageCursor, StoryListController};
pub use playback::{
    PlaybackCursor, PlaybackPhase, StoryPlaybackController, StoryRequest, StoryResponse,
};
pub use timer::{PlaybackTimer, TimerTick};
