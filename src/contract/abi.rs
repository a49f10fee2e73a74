use alloy::sol;

sol! {
    /// The slice of the dashboard's ERC-721 contract this crate calls.
    #[sol(rpc)]
    interface IDashboardNft {
        event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);

        function mint() external;
        function nextTokenId() external view returns (uint256);
        function safeTransferFrom(address from, address to, uint256 tokenId) external;
        function ownerOf(uint256 tokenId) external view returns (address);
    }
}
