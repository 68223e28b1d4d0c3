#![allow(dead_code)]

pub mod app;

pub use app::{
    admin_key, body_json, create_user, get, make_test_app, make_test_app_with, post_json,
};
