pub mod composer;
pub mod input_buffer;
pub mod message_list;
