pub mod json_api;

pub use json_api::{
    generate_board, generate_board_json, ApiError, ApiResponse, BoardRequest, BoardResponse,
    API_VERSION,
};
