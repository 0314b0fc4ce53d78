pub mod task;
pub mod user;

pub use task::{
    normalize, normalize_all, CreateTaskRequest, FilterQuery, NewTask, TaskDto, TaskFilter,
    TaskIdPath, TaskPatch, TaskRecord, UpdateTaskRequest,
};
pub use user::{CreatedUser, LoginResponse, NewUser, SignupResponse, UserRecord};
