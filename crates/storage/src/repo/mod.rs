mod jobs;
mod kv;
mod sorted_sets;
