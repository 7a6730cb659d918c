
///
/// Calls `body` on every element of `data`, in parallel if the feature `parallel` is enabled.
///
/// Every thread (or rather, every rayon job) gets its own state, created by `init_thread`,
/// which can be used e.g. for reusable buffers.
///
#[stability::unstable(feature = "enable")]
#[cfg(feature = "parallel")]
pub fn potential_parallel_for_each<D, T, F, G, S>(data: D, init_thread: G, body: F)
    where F: Fn(&mut S, usize, T) + Send + Sync,
        G: Fn() -> S + Send + Sync,
        T: Send,
        D: rayon::iter::IntoParallelIterator<Item = T>,
        <D as rayon::iter::IntoParallelIterator>::Iter: rayon::iter::IndexedParallelIterator
{
    <_ as rayon::iter::ParallelIterator>::for_each_init(<_ as rayon::iter::IndexedParallelIterator>::enumerate(<_ as rayon::iter::IntoParallelIterator>::into_par_iter(data)), init_thread, |state, (i, el)| body(state, i, el))
}

#[stability::unstable(feature = "enable")]
#[cfg(not(feature = "parallel"))]
pub fn potential_parallel_for_each<D, T, F, G, S>(data: D, init_thread: G, body: F)
    where F: Fn(&mut S, usize, T) + Send + Sync,
        G: Fn() -> S + Send + Sync,
        D: IntoIterator<Item = T>
{
    let mut state = init_thread();
    for (i, el) in data.into_iter().enumerate() {
        body(&mut state, i, el);
    }
}

///
/// Maps every element of `data` through `f`, in parallel if the feature `parallel` is enabled.
/// The order of the result matches the order of `data`.
///
#[stability::unstable(feature = "enable")]
#[cfg(feature = "parallel")]
pub fn potential_parallel_map<T, U, F>(data: Vec<T>, f: F) -> Vec<U>
    where F: Fn(usize, T) -> U + Send + Sync,
        T: Send,
        U: Send
{
    <_ as rayon::iter::ParallelIterator>::collect(<_ as rayon::iter::ParallelIterator>::map(<_ as rayon::iter::IndexedParallelIterator>::enumerate(<_ as rayon::iter::IntoParallelIterator>::into_par_iter(data)), |(i, el)| f(i, el)))
}

#[stability::unstable(feature = "enable")]
#[cfg(not(feature = "parallel"))]
pub fn potential_parallel_map<T, U, F>(data: Vec<T>, f: F) -> Vec<U>
    where F: Fn(usize, T) -> U + Send + Sync
{
    data.into_iter().enumerate().map(|(i, el)| f(i, el)).collect()
}

#[test]
fn test_potential_parallel_map_keeps_order() {
    let result = potential_parallel_map((0..100).collect::<Vec<i64>>(), |i, x| x * x + i as i64);
    assert_eq!((0..100).map(|x: i64| x * x + x).collect::<Vec<_>>(), result);
}

#[test]
fn test_potential_parallel_for_each() {
    let mut data = vec![0usize; 50];
    potential_parallel_for_each(&mut data, || 1, |offset, i, x: &mut usize| *x = i + *offset);
    assert_eq!((1..51).collect::<Vec<_>>(), data);
}
