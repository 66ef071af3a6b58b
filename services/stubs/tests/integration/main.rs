mod admin_api_test;
mod countdown_test;
mod helpers;
