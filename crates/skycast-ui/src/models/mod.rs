pub mod weather_detail_model;
