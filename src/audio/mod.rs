pub mod coefficients;
pub mod constants;
pub mod fft_data_generator;
pub mod filter_chain;
pub mod processor;
pub mod sample_fifo;
pub mod window_functions;
