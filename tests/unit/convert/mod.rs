mod decode;
mod jpeg;
